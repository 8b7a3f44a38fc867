//! The reducer: `update(app, msg)` returns the next model and the side
//! effects the runtime must perform. Nothing in here blocks or does I/O.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::audio::PlaybackSnapshot;
use crate::browser::{FileBrowser, FileEntry, Open};
use crate::engine::{PlayState, TrackInfo};
use crate::library::{LibBrowser, Library, Track};
use crate::playlist::LoopMode;

use super::keymap::{Action, browser_action, global_action, help_action, playlist_action};
use super::model::{App, ErrorBanner, Focus, LeftPanel, Transition};

const VOLUME_STEP: f32 = 0.1;

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick(PlaybackSnapshot),
    TrackStarted { info: TrackInfo, session: u64 },
    TrackFailed(String),
    LibraryScanned(Result<Library, String>),
    DirRead {
        dir: PathBuf,
        entries: Result<Vec<FileEntry>, String>,
    },
    MetadataLoaded { track: Track, play: bool },
    Error(String),
    ClearError { stamp: u64 },
    SnapshotsClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTrack { path: PathBuf },
    Stop,
    Pause,
    Resume,
    SeekBy(i64),
    SetVolume(f32),
    ScheduleClearError { stamp: u64, after: Duration },
    ScanLibrary(PathBuf),
    ReadDir { dir: PathBuf, show_hidden: bool },
    LoadMetadata { path: PathBuf, play: bool },
    Quit,
}

pub fn update(mut app: App, msg: Msg) -> (App, Vec<Effect>) {
    let mut fx = Vec::new();
    match msg {
        Msg::Key(key) => on_key(&mut app, &key, &mut fx),
        Msg::Resize(w, h) => app.size = (w, h),
        Msg::Tick(snap) => on_tick(&mut app, snap, &mut fx),
        Msg::TrackStarted { info, session } => commit_start(&mut app, info, session),
        Msg::TrackFailed(message) => {
            app.transition = Transition::Idle;
            // The next snapshot restores Playing if the old track survived.
            app.playback.state = PlayState::Stopped;
            show_error(&mut app, message, &mut fx);
        }
        Msg::LibraryScanned(Ok(library)) => {
            app.left = LeftPanel::Library(LibBrowser::new(library));
        }
        Msg::LibraryScanned(Err(e)) => {
            let root = match &app.left {
                LeftPanel::Scanning { root } => root.clone(),
                _ => PathBuf::from("."),
            };
            show_error(&mut app, format!("Library scan failed: {e}"), &mut fx);
            let browser = FileBrowser::new(&root);
            fx.push(Effect::ReadDir {
                dir: browser.dir().to_path_buf(),
                show_hidden: browser.show_hidden(),
            });
            app.left = LeftPanel::Files(browser);
        }
        Msg::DirRead { dir, entries } => {
            let LeftPanel::Files(browser) = &mut app.left else {
                return (app, fx);
            };
            match entries {
                Ok(entries) => {
                    browser.apply_listing(dir, entries);
                }
                Err(e) if browser.is_requested(&dir) => {
                    show_error(&mut app, format!("{}: {e}", dir.display()), &mut fx);
                }
                Err(e) => log::debug!("ignoring stale error for {}: {e}", dir.display()),
            }
        }
        Msg::MetadataLoaded { track, play } => {
            app.playlist.add_track(track);
            if play && !app.is_loading() {
                let index = app.playlist.len() - 1;
                start_playing(&mut app, index, &mut fx);
            }
        }
        Msg::Error(message) => show_error(&mut app, message, &mut fx),
        Msg::ClearError { stamp } => {
            if app.error.as_ref().is_some_and(|e| e.stamp == stamp) {
                app.error = None;
            }
        }
        Msg::SnapshotsClosed => app.snapshots_open = false,
    }
    (app, fx)
}

fn show_error(app: &mut App, message: String, fx: &mut Vec<Effect>) {
    log::warn!("{message}");
    app.error_seq += 1;
    let stamp = app.error_seq;
    app.error = Some(ErrorBanner { message, stamp });
    fx.push(Effect::ScheduleClearError {
        stamp,
        after: app.options.error_timeout,
    });
}

/// Request playback of `index`. The playlist pointer only moves once the
/// engine confirms.
fn start_playing(app: &mut App, index: usize, fx: &mut Vec<Effect>) -> bool {
    let Some(track) = app.playlist.get_track(index) else {
        return false;
    };
    fx.push(Effect::StartTrack {
        path: track.path.clone(),
    });
    app.transition = Transition::Pending { index, track };
    true
}

fn commit_start(app: &mut App, info: TrackInfo, session: u64) {
    app.session = session;
    let Transition::Pending { index, track } = std::mem::take(&mut app.transition) else {
        log::debug!("start confirmed with nothing pending");
        return;
    };
    // The playlist may have been edited while loading; follow the path.
    let index = if app.playlist.tracks().get(index).is_some_and(|t| t.path == track.path) {
        Some(index)
    } else {
        app.playlist.tracks().iter().position(|t| t.path == track.path)
    };
    match index {
        Some(i) => app.playlist.set_current_track(i),
        None => app.playlist.clear_current(),
    }
    app.playback = PlaybackSnapshot {
        state: PlayState::Playing,
        position: Duration::ZERO,
        duration: info.duration,
        current_loop: 0,
        has_loop: info.has_loop,
        session,
        ..app.playback
    };
    app.current_track = Some(track);
    app.current_info = Some(info);
}

fn on_tick(app: &mut App, snap: PlaybackSnapshot, fx: &mut Vec<Effect>) {
    if snap.session != app.session {
        // Taken before the latest start was confirmed.
        app.playback.volume = snap.volume;
        return;
    }
    let was_active = app.is_active();
    if app.is_loading() && snap.state == PlayState::Stopped {
        // The engine reports Stopped while switching tracks.
        let shown = app.playback.state;
        app.playback = PlaybackSnapshot { state: shown, ..snap };
        return;
    }
    app.playback = snap;
    if was_active && snap.state == PlayState::Stopped {
        on_track_ended(app, fx);
    }
}

fn on_track_ended(app: &mut App, fx: &mut Vec<Effect>) {
    if app.is_loading() {
        return;
    }
    let target = match app.playlist.loop_mode() {
        LoopMode::One => app
            .playlist
            .current_index()
            .or_else(|| app.playlist.peek_next_track()),
        _ => app.playlist.peek_next_track(),
    };
    if target.is_some_and(|i| start_playing(app, i, fx)) {
        return;
    }
    stop_playback(app, fx);
}

/// Stop the engine and forget the current track.
fn stop_playback(app: &mut App, fx: &mut Vec<Effect>) {
    fx.push(Effect::Stop);
    app.playlist.clear_current();
    app.current_track = None;
    app.current_info = None;
    reset_position(app);
    app.playback.state = PlayState::Stopped;
}

fn reset_position(app: &mut App) {
    app.playback.position = Duration::ZERO;
    app.playback.current_loop = 0;
}

fn on_key(app: &mut App, key: &KeyEvent, fx: &mut Vec<Effect>) {
    if app.show_help {
        if help_action(key).is_some() {
            app.show_help = false;
        }
        return;
    }
    if let Some(action) = global_action(key) {
        on_global(app, action, fx);
        return;
    }
    match app.focus {
        Focus::Browser => {
            if let Some(action) = browser_action(key) {
                on_browser(app, action, fx);
            }
        }
        Focus::Playlist => {
            if let Some(action) = playlist_action(key) {
                on_playlist(app, action, fx);
            }
        }
    }
}

fn on_global(app: &mut App, action: Action, fx: &mut Vec<Effect>) {
    match action {
        Action::Quit => fx.push(Effect::Quit),
        Action::ToggleHelp => app.show_help = !app.show_help,
        Action::PlayPause => toggle_play_pause(app, fx),
        Action::Next | Action::Prev => {
            if app.is_loading() {
                return;
            }
            let target = if action == Action::Next {
                app.playlist.peek_next_track()
            } else {
                app.playlist.peek_prev_track()
            };
            if let Some(i) = target {
                fx.push(Effect::Stop);
                start_playing(app, i, fx);
            } else {
                reset_position(app);
            }
        }
        Action::Stop => {
            fx.push(Effect::Stop);
            app.playback.state = PlayState::Stopped;
            reset_position(app);
        }
        Action::SeekForward => fx.push(Effect::SeekBy(app.options.seek_seconds)),
        Action::SeekBack => fx.push(Effect::SeekBy(-app.options.seek_seconds)),
        Action::VolumeUp | Action::VolumeDown => {
            let step = if action == Action::VolumeUp {
                VOLUME_STEP
            } else {
                -VOLUME_STEP
            };
            // Round to one decimal so repeated steps don't drift.
            let v = ((app.volume + step) * 10.0).round() / 10.0;
            app.volume = v.clamp(0.0, 2.0);
            app.playback.volume = app.volume;
            fx.push(Effect::SetVolume(app.volume));
        }
        Action::SwitchFocus => {
            app.focus = match app.focus {
                Focus::Browser => Focus::Playlist,
                Focus::Playlist => Focus::Browser,
            };
        }
        _ => {}
    }
}

fn toggle_play_pause(app: &mut App, fx: &mut Vec<Effect>) {
    if app.is_loading() {
        return;
    }
    match app.playback.state {
        PlayState::Stopped => {
            let index = app.playlist.current_index().unwrap_or(0);
            start_playing(app, index, fx);
        }
        PlayState::Playing | PlayState::Fading => {
            fx.push(Effect::Pause);
            app.playback.state = PlayState::Paused;
        }
        PlayState::Paused => {
            fx.push(Effect::Resume);
            app.playback.state = PlayState::Playing;
        }
    }
}

fn on_playlist(app: &mut App, action: Action, fx: &mut Vec<Effect>) {
    let page = app.page_size();
    let playlist = &mut app.playlist;
    match action {
        Action::Up => playlist.move_cursor_up(1),
        Action::Down => playlist.move_cursor_down(1),
        Action::PageUp => playlist.move_cursor_up(page),
        Action::PageDown => playlist.move_cursor_down(page),
        Action::Top => playlist.select_first(),
        Action::Bottom => playlist.select_last(),
        Action::MoveUp => playlist.move_up(),
        Action::MoveDown => playlist.move_down(),
        Action::Shuffle => playlist.shuffle(),
        Action::CycleLoop => playlist.cycle_loop_mode(),
        Action::PlaySelected => {
            if !app.is_loading() {
                let index = app.playlist.selected_index();
                start_playing(app, index, fx);
            }
        }
        Action::Remove => {
            let removing_current =
                playlist.current_index().is_some_and(|c| c == playlist.selected_index());
            playlist.remove_selected();
            if removing_current {
                stop_playback(app, fx);
            }
        }
        Action::Clear => {
            stop_playback(app, fx);
            app.playlist.clear();
        }
        _ => {}
    }
}

fn on_browser(app: &mut App, action: Action, fx: &mut Vec<Effect>) {
    let page = app.page_size();
    let loading = app.is_loading();
    match &mut app.left {
        LeftPanel::Scanning { .. } => {}
        LeftPanel::Library(browser) => match action {
            Action::Up => browser.move_up(1),
            Action::Down => browser.move_down(1),
            Action::PageUp => browser.move_up(page),
            Action::PageDown => browser.move_down(page),
            Action::Top => browser.select_first(),
            Action::Bottom => browser.select_last(),
            Action::Back => browser.back(),
            Action::Open => {
                if let Some(track) = browser.enter() {
                    app.playlist.add_track(track);
                }
            }
            Action::AddAll => {
                let tracks = browser.selected_tracks();
                app.playlist.add_tracks(tracks);
            }
            Action::AddAndPlay => {
                if loading {
                    return;
                }
                let tracks = browser.selected_tracks();
                if tracks.is_empty() {
                    return;
                }
                let first = app.playlist.len();
                app.playlist.add_tracks(tracks);
                start_playing(app, first, fx);
            }
            _ => {}
        },
        LeftPanel::Files(browser) => match action {
            Action::Up => browser.move_up(1),
            Action::Down => browser.move_down(1),
            Action::PageUp => browser.move_up(page),
            Action::PageDown => browser.move_down(page),
            Action::Top => browser.select_first(),
            Action::Bottom => browser.select_last(),
            Action::Back => {
                if let Some(dir) = browser.parent() {
                    fx.push(Effect::ReadDir {
                        dir,
                        show_hidden: browser.show_hidden(),
                    });
                }
            }
            Action::ToggleHidden => {
                let dir = browser.toggle_hidden();
                fx.push(Effect::ReadDir {
                    dir,
                    show_hidden: browser.show_hidden(),
                });
            }
            Action::Open | Action::AddAndPlay => match browser.open() {
                Some(Open::Dir(dir)) => fx.push(Effect::ReadDir {
                    dir,
                    show_hidden: browser.show_hidden(),
                }),
                Some(Open::File(path)) => {
                    let play = action == Action::AddAndPlay;
                    if !(play && loading) {
                        fx.push(Effect::LoadMetadata { path, play });
                    }
                }
                None => {}
            },
            _ => {}
        },
    }
}
