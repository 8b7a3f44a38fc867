use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::Duration;

fn track(name: &str, secs: u64) -> Track {
    Track {
        path: PathBuf::from(format!("/music/{name}.vgm")),
        title: name.to_string(),
        duration: Duration::from_secs(secs),
        ..Track::default()
    }
}

fn playlist(names: &[&str], mode: LoopMode) -> Playlist {
    let mut p = Playlist::new(mode);
    p.add_tracks(names.iter().map(|n| track(n, 60)));
    p
}

fn titles(p: &Playlist) -> Vec<&str> {
    p.tracks().iter().map(|t| t.title.as_str()).collect()
}

#[test]
fn empty_playlist_is_inert() {
    let mut p = Playlist::default();
    assert_eq!(p.next_track(), None);
    assert_eq!(p.prev_track(), None);
    assert_eq!(p.peek_next_track(), None);
    p.remove_selected();
    p.move_up();
    p.move_down();
    p.shuffle();
    p.set_current_track(3);
    assert_eq!(p.current_index(), None);
    assert_eq!(p.get_track(0), None);
    assert_eq!(p.title(), "Playlist");
}

#[test]
fn add_does_not_touch_current() {
    let mut p = playlist(&["a", "b"], LoopMode::None);
    p.set_current_track(1);
    p.add_track(track("c", 10));
    assert_eq!(p.current_index(), Some(1));
    assert_eq!(p.len(), 3);
    assert_eq!(p.title(), "Playlist [2/3]");
}

#[test]
fn set_current_rejects_out_of_range() {
    let mut p = playlist(&["a", "b"], LoopMode::None);
    p.set_current_track(1);
    assert_eq!(p.current_index(), Some(1));
    p.set_current_track(2);
    assert_eq!(p.current_index(), None);
    assert_eq!(p.title(), "Playlist [2]");
}

#[test]
fn loop_all_wraps_forward_through_every_index() {
    let mut p = playlist(&["a", "b", "c", "d"], LoopMode::All);
    p.set_current_track(0);
    let seen: Vec<_> = (0..4).map(|_| p.next_track()).collect();
    assert_eq!(seen, vec![Some(1), Some(2), Some(3), Some(0)]);
    assert_eq!(p.selected_index(), 0);
}

#[test]
fn loop_all_wraps_backward() {
    let mut p = playlist(&["a", "b", "c"], LoopMode::All);
    assert_eq!(p.peek_prev_track(), Some(2));
    p.set_current_track(0);
    assert_eq!(p.prev_track(), Some(2));
    assert_eq!(p.prev_track(), Some(1));
}

#[test]
fn no_loop_stops_at_the_ends_without_moving() {
    for mode in [LoopMode::None, LoopMode::One] {
        let mut p = playlist(&["a", "b", "c"], mode);
        p.set_current_track(2);
        assert_eq!(p.next_track(), None);
        assert_eq!(p.current_index(), Some(2));

        p.set_current_track(0);
        assert_eq!(p.prev_track(), None);
        assert_eq!(p.current_index(), Some(0));
    }
}

#[test]
fn next_from_nothing_starts_at_zero() {
    let mut p = playlist(&["a", "b"], LoopMode::None);
    assert_eq!(p.peek_next_track(), Some(0));
    assert_eq!(p.peek_prev_track(), None);
    assert_eq!(p.next_track(), Some(0));
    assert_eq!(p.current_index(), Some(0));
}

#[test]
fn peek_never_mutates() {
    let mut p = playlist(&["a", "b", "c"], LoopMode::All);
    p.set_current_track(1);
    p.move_cursor_down(1);
    let _ = p.peek_next_track();
    let _ = p.peek_prev_track();
    assert_eq!(p.current_index(), Some(1));
    assert_eq!(p.selected_index(), 1);
}

#[test]
fn remove_keeps_current_identity() {
    let mut p = Playlist::default();
    p.add_tracks([track("A", 180), track("B", 120), track("C", 60)]);
    p.set_current_track(1);

    p.select_first();
    p.remove_selected();
    assert_eq!(titles(&p), vec!["B", "C"]);
    assert_eq!(p.current_index(), Some(0));
    assert_eq!(p.selected_index(), 0);

    p.remove_selected();
    assert_eq!(titles(&p), vec!["C"]);
    assert_eq!(p.current_index(), None);
}

#[test]
fn remove_after_current_and_at_end_clamps_cursor() {
    let mut p = playlist(&["a", "b", "c"], LoopMode::None);
    p.set_current_track(0);
    p.select_last();
    p.remove_selected();
    assert_eq!(titles(&p), vec!["a", "b"]);
    assert_eq!(p.current_index(), Some(0));
    assert_eq!(p.selected_index(), 1);

    p.remove_selected();
    p.remove_selected();
    assert!(p.is_empty());
    assert_eq!(p.selected_index(), 0);
    assert_eq!(p.current_index(), None);
}

#[test]
fn clear_resets_everything() {
    let mut p = playlist(&["a", "b"], LoopMode::All);
    p.set_current_track(1);
    p.select_last();
    p.clear();
    assert!(p.is_empty());
    assert_eq!(p.current_index(), None);
    assert_eq!(p.selected_index(), 0);
    assert_eq!(p.loop_mode(), LoopMode::All);
}

#[test]
fn move_up_and_down_carry_current() {
    let mut p = playlist(&["a", "b", "c"], LoopMode::None);
    p.set_current_track(1);
    p.move_cursor_down(1);

    p.move_up();
    assert_eq!(titles(&p), vec!["b", "a", "c"]);
    assert_eq!(p.current_index(), Some(0));
    assert_eq!(p.selected_index(), 0);

    // Cursor at the top: nothing to swap with.
    p.move_up();
    assert_eq!(titles(&p), vec!["b", "a", "c"]);

    p.move_cursor_down(1); // "a"
    p.move_down();
    assert_eq!(titles(&p), vec!["b", "c", "a"]);
    assert_eq!(p.current_index(), Some(0));

    p.move_down();
    assert_eq!(p.selected_index(), 2);
    assert_eq!(titles(&p), vec!["b", "c", "a"]);

    p.select_first();
    p.move_down();
    assert_eq!(titles(&p), vec!["c", "b", "a"]);
    assert_eq!(p.current_index(), Some(1));
    assert_eq!(p.current_track().unwrap().title, "b");
}

#[test]
fn shuffle_keeps_tracks_and_relocates_current() {
    let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
    for seed in 0..16 {
        let mut p = playlist(&names, LoopMode::None);
        p.set_current_track(5);
        p.shuffle_with(&mut StdRng::seed_from_u64(seed));

        let mut after: Vec<&str> = titles(&p);
        after.sort_unstable();
        assert_eq!(after, names);
        assert_eq!(p.current_track().unwrap().title, "f");
    }
}

#[test]
fn shuffle_without_current_leaves_pointer_empty() {
    let mut p = playlist(&["a", "b", "c"], LoopMode::None);
    p.shuffle_with(&mut StdRng::seed_from_u64(1));
    assert_eq!(p.current_index(), None);
}

#[test]
fn random_edits_keep_pointer_on_the_same_track() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut p = Playlist::new(LoopMode::All);
    let mut serial = 0;
    let mut playing: Option<String> = None;

    for _ in 0..500 {
        match rng.random_range(0..7) {
            0 | 1 => {
                serial += 1;
                p.add_track(track(&format!("t{serial}"), 30));
            }
            2 => {
                let removing = p.selected_track().map(|t| t.title);
                p.remove_selected();
                if removing.is_some() && removing == playing {
                    playing = None;
                }
            }
            3 => p.move_up(),
            4 => p.move_down(),
            5 => {
                let n = rng.random_range(0..3);
                if rng.random_bool(0.5) {
                    p.move_cursor_up(n)
                } else {
                    p.move_cursor_down(n)
                }
            }
            _ => {
                if !p.is_empty() {
                    let i = rng.random_range(0..p.len());
                    p.set_current_track(i);
                    playing = p.current_track().map(|t| t.title);
                }
            }
        }

        if let Some(c) = p.current_index() {
            assert!(c < p.len());
        }
        if !p.is_empty() {
            assert!(p.selected_index() < p.len());
        }
        assert_eq!(p.current_track().map(|t| t.title), playing);
    }
}

#[test]
fn loop_mode_cycles_and_labels() {
    let mut p = Playlist::default();
    assert_eq!(p.loop_mode().label(), "-");
    p.cycle_loop_mode();
    assert_eq!(p.loop_mode(), LoopMode::One);
    assert_eq!(p.loop_mode().label(), "1");
    p.cycle_loop_mode();
    assert_eq!(p.loop_mode().label(), "A");
    p.cycle_loop_mode();
    assert_eq!(p.loop_mode(), LoopMode::None);

    assert_eq!(LoopMode::from(LoopModeSetting::All), LoopMode::All);
}

#[test]
fn get_track_hands_out_copies() {
    let p = playlist(&["a"], LoopMode::None);
    let mut copy = p.get_track(0).unwrap();
    copy.title.push_str("changed");
    assert_eq!(p.tracks()[0].title, "a");
    assert_eq!(p.get_track(1), None);
}
