use super::psg::Sn76489;
use super::song::{self, Event, SongBuilder};
use super::*;
use std::io::Write;
use std::time::Duration;

fn put_u32(d: &mut [u8], off: usize, v: u32) {
    d[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

/// VGM 1.50 with an SN76489 clock, `commands` at 0x40 and optional loop/GD3.
fn vgm_file(commands: &[u8], loop_at: Option<usize>, gd3: Option<&[&str]>) -> Vec<u8> {
    let mut d = vec![0u8; 0x40];
    d[0..4].copy_from_slice(b"Vgm ");
    put_u32(&mut d, 0x08, 0x150);
    put_u32(&mut d, 0x0C, 3_579_545);
    put_u32(&mut d, 0x34, 0x40 - 0x34);
    if let Some(off) = loop_at {
        put_u32(&mut d, 0x1C, (0x40 + off - 0x1C) as u32);
    }
    d.extend_from_slice(commands);
    if let Some(fields) = gd3 {
        let gd3_at = d.len();
        put_u32(&mut d, 0x14, (gd3_at - 0x14) as u32);
        let mut body = Vec::new();
        for i in 0..11 {
            for unit in fields.get(i).copied().unwrap_or("").encode_utf16() {
                body.extend_from_slice(&unit.to_le_bytes());
            }
            body.extend_from_slice(&[0, 0]);
        }
        d.extend_from_slice(b"Gd3 ");
        d.extend_from_slice(&0x100u32.to_le_bytes());
        d.extend_from_slice(&(body.len() as u32).to_le_bytes());
        d.extend(body);
    }
    let eof = d.len();
    put_u32(&mut d, 0x04, (eof - 0x04) as u32);
    d
}

/// One second of intro followed by a half-second loop.
fn looping_commands() -> Vec<u8> {
    vec![0x50, 0x90, 0x61, 0x44, 0xAC, 0x61, 0x22, 0x56, 0x66]
}

const LOOP_OFFSET: usize = 5;

fn write_temp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn render_frames(engine: &mut VgmEngine, frames: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; frames * 2];
    let mut done = 0;
    while done < frames {
        let n = (frames - done).min(4096);
        engine.render(&mut out[done * 2..(done + n) * 2]);
        done += n;
    }
    out
}

fn engine_1s_fade() -> VgmEngine {
    VgmEngine::new(44_100, 2, Duration::from_secs(1), Duration::from_millis(500))
}

#[test]
fn supported_extensions_are_case_insensitive() {
    assert!(is_supported(Path::new("/music/Sonic/01 Green Hill.VGZ")));
    assert!(is_supported(Path::new("a.s98")));
    assert!(is_supported(Path::new("a.Dro")));
    assert!(!is_supported(Path::new("a.mp3")));
    assert!(!is_supported(Path::new("vgm")));
}

#[test]
fn vgm_durations_cover_intro_loops_and_fade() {
    let data = vgm_file(&looping_commands(), Some(LOOP_OFFSET), None);
    let song = song::parse(&data, Path::new("t.vgm")).unwrap();

    assert_eq!(song.total_samples, 66_150);
    assert_eq!(song.loop_samples, 22_050);
    assert!(song.has_loop());
    assert_eq!(song.psg_clock, Some(3_579_545));
    assert_eq!(song.format, "VGM 1.50");

    let info = song.track_info(2, Duration::from_secs(4));
    assert_eq!(info.duration, Duration::from_secs(6));
    assert_eq!(info.loop_point, Duration::from_secs(1));
    assert!(info.has_loop);
    assert_eq!(info.chips, vec![ChipInfo::new("SN76489", "PSG")]);
}

#[test]
fn vgm_without_loop_reports_stream_length() {
    let data = vgm_file(&[0x62, 0x63, 0x7F, 0x80, 0x66], None, None);
    let song = song::parse(&data, Path::new("t.vgm")).unwrap();
    assert_eq!(song.total_samples, 735 + 882 + 16);
    assert!(!song.has_loop());
    assert_eq!(song.playback_samples(2, 1000, 500), 735 + 882 + 16 + 500);
    assert_eq!(song.display_samples(2, 1000), 735 + 882 + 16);
}

#[test]
fn zero_length_loop_counts_as_no_loop() {
    // Loop offset points at the end-of-data command.
    let data = vgm_file(&[0x61, 0x44, 0xAC, 0x66], Some(3), None);
    let song = song::parse(&data, Path::new("t.vgm")).unwrap();
    assert!(!song.has_loop());
    assert_eq!(song.loop_index, None);
}

#[test]
fn vgm_unknown_command_is_a_parse_error() {
    let data = vgm_file(&[0x21, 0x00, 0x66], None, None);
    let err = song::parse(&data, Path::new("t.vgm")).unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "{err}");
}

#[test]
fn vgm_skips_other_chip_writes_and_data_blocks() {
    let commands = [
        0x52, 0x28, 0x00, // YM2612 port 0
        0x67, 0x66, 0x00, 0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB, // data block
        0x4F, 0xF0, // stereo
        0x50, 0x9F, 0x70, 0x66,
    ];
    let data = vgm_file(&commands, None, None);
    let song = song::parse(&data, Path::new("t.vgm")).unwrap();
    assert_eq!(
        song.events,
        vec![Event::PsgStereo(0xF0), Event::Psg(0x9F), Event::Wait(1)]
    );
}

#[test]
fn missing_vgm_header_is_a_parse_error() {
    let err = song::parse(b"not a vgm file", Path::new("t.vgm")).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn gd3_prefers_english_and_falls_back_to_japanese() {
    let fields = [
        "Green Hill Zone",
        "グリーンヒル",
        "",
        "ソニック",
        "Sega Master System",
        "",
        "Masato Nakamura",
        "",
        "1991",
        "ripper",
        "first stage",
    ];
    let data = vgm_file(&[0x62, 0x66], None, Some(&fields[..]));
    let song = song::parse(&data, Path::new("t.vgm")).unwrap();
    assert_eq!(song.tags.title, "Green Hill Zone");
    assert_eq!(song.tags.game, "ソニック");
    assert_eq!(song.tags.system, "Sega Master System");
    assert_eq!(song.tags.composer, "Masato Nakamura");
    assert_eq!(song.tags.date, "1991");
    assert_eq!(song.tags.vgm_by, "ripper");
    assert_eq!(song.tags.notes, "first stage");
}

#[test]
fn read_track_info_inflates_vgz() {
    let dir = tempfile::tempdir().unwrap();
    let raw = vgm_file(&looping_commands(), Some(LOOP_OFFSET), Some(&["Title"][..]));
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(&raw).unwrap();
    let path = write_temp(&dir, "01 Title.vgz", &enc.finish().unwrap());

    let info = read_track_info(&path).unwrap();
    assert_eq!(info.title, "Title");
    assert_eq!(info.path, path);
    assert_eq!(
        info.duration,
        Duration::from_millis(1000 + 1000 + DEFAULT_FADE_MS)
    );
}

#[test]
fn read_track_info_rejects_unsupported_extension() {
    let err = read_track_info(Path::new("/nowhere/song.mp3")).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
}

#[test]
fn gym_frames_and_psg_writes() {
    let data = [0x03, 0x9F, 0x00, 0x00, 0x01, 0x2A, 0x00, 0x02, 0x30, 0x01, 0x00];
    let song = song::parse(&data, Path::new("sonic.gym")).unwrap();
    assert_eq!(song.total_samples, 735 * 3);
    assert_eq!(song.events[0], Event::Psg(0x9F));
    assert_eq!(song.format, "GYM");
    assert_eq!(song.tags.system, "Sega Mega Drive / Genesis");
    assert_eq!(song.chips.len(), 2);
}

#[test]
fn gym_unknown_command_is_a_parse_error() {
    let err = song::parse(&[0x00, 0x07], Path::new("x.gym")).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn dro_v2_delays_and_hardware() {
    let mut d = Vec::new();
    d.extend_from_slice(b"DBRAWOPL");
    d.extend_from_slice(&2u16.to_le_bytes());
    d.extend_from_slice(&0u16.to_le_bytes());
    d.extend_from_slice(&3u32.to_le_bytes()); // pairs
    d.extend_from_slice(&356u32.to_le_bytes()); // ms
    d.extend_from_slice(&[2, 0, 0, 0x70, 0x71, 2, 0x01, 0x02]);
    d.extend_from_slice(&[0x00, 0x40, 0x70, 99, 0x71, 0]);

    let song = song::parse(&d, Path::new("doom.dro")).unwrap();
    // 100 ms + 256 ms, the fractional sample carried and dropped at the end.
    assert_eq!(song.total_samples, 4_410 + 11_289);
    assert_eq!(song.format, "DRO v2.0");
    assert_eq!(song.chips, vec![ChipInfo::new("YMF262", "silent")]);
    assert_eq!(song.psg_clock, None);
    assert_eq!(song.tags.system, "PC (AdLib)");
}

#[test]
fn dro_v1_with_wide_hardware_field() {
    let mut d = Vec::new();
    d.extend_from_slice(b"DBRAWOPL");
    d.extend_from_slice(&0u16.to_le_bytes());
    d.extend_from_slice(&1u16.to_le_bytes());
    d.extend_from_slice(&1000u32.to_le_bytes()); // ms
    d.extend_from_slice(&5u32.to_le_bytes()); // data bytes
    d.extend_from_slice(&1u32.to_le_bytes()); // hardware as u32
    d.extend_from_slice(&[0x01, 0xE7, 0x03, 0x20, 0x01]);

    let song = song::parse(&d, Path::new("keen.dro")).unwrap();
    assert_eq!(song.total_samples, 44_100);
    assert_eq!(song.format, "DRO v1.0");
    assert_eq!(song.chips, vec![ChipInfo::new("2xYM3812", "silent")]);
}

#[test]
fn dro_v1_with_byte_hardware_field() {
    let mut d = Vec::new();
    d.extend_from_slice(b"DBRAWOPL");
    d.extend_from_slice(&1u16.to_le_bytes());
    d.extend_from_slice(&0u16.to_le_bytes());
    d.extend_from_slice(&10u32.to_le_bytes());
    d.extend_from_slice(&2u32.to_le_bytes());
    d.push(2);
    d.extend_from_slice(&[0x00, 0x09]);

    let song = song::parse(&d, Path::new("wolf.dro")).unwrap();
    assert_eq!(song.total_samples, 441);
    assert_eq!(song.chips, vec![ChipInfo::new("YMF262", "silent")]);
}

#[test]
fn s98_v3_dcsg_writes_loop_and_tags() {
    let mut d = vec![0u8; 0x30];
    d[0..4].copy_from_slice(b"S983");
    let dump = [0x00, 0x00, 0x9F, 0xFF, 0xFE, 0x01, 0xFD];
    let tag_at = 0x30 + dump.len();
    // One-second syncs keep the sample math exact.
    put_u32(&mut d, 0x04, 1);
    put_u32(&mut d, 0x08, 1);
    put_u32(&mut d, 0x10, tag_at as u32);
    put_u32(&mut d, 0x14, 0x30);
    put_u32(&mut d, 0x18, 0x34);
    put_u32(&mut d, 0x1C, 1);
    put_u32(&mut d, 0x20, 16);
    put_u32(&mut d, 0x24, 3_579_545);
    d.extend_from_slice(&dump);
    d.extend_from_slice(b"[S98]");
    d.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    d.extend_from_slice(b"title=Opening\ngame=Ys\nartist=Yuzo Koshiro\n\0");

    let song = song::parse(&d, Path::new("ys.s98")).unwrap();
    assert_eq!(song.events[0], Event::Psg(0x9F));
    // One sync, then 1 + 2 more.
    assert_eq!(song.total_samples, 44_100 + 132_300);
    assert_eq!(song.loop_samples, 132_300);
    assert_eq!(song.psg_clock, Some(3_579_545));
    assert_eq!(song.tags.title, "Opening");
    assert_eq!(song.tags.game, "Ys");
    assert_eq!(song.tags.composer, "Yuzo Koshiro");
    assert_eq!(song.format, "S98 v3");
    assert_eq!(song.chips, vec![ChipInfo::new("SN76489", "PSG")]);
}

#[test]
fn builder_keeps_waits_apart_at_loop_start() {
    let mut b = SongBuilder::new();
    b.wait(10);
    b.wait(5);
    b.mark_loop();
    b.wait(7);
    b.mark_loop();
    b.wait(3);
    let song = b.finish(None, Default::default(), "x".into(), vec![], Path::new("x"));
    assert_eq!(song.total_samples, 25);
    assert_eq!(song.events, vec![Event::Wait(15), Event::Wait(10)]);
    assert_eq!(song.loop_index, Some(1));
    assert_eq!(song.loop_samples, 10);
}

#[test]
fn builder_carries_fractional_samples() {
    let mut b = SongBuilder::new();
    let mut carry = 0.0;
    for _ in 0..4 {
        // 344.53125 samples each
        b.wait_seconds(&mut carry, 1.0 / 128.0);
    }
    let song = b.finish(None, Default::default(), "x".into(), vec![], Path::new("x"));
    assert_eq!(song.total_samples, 1_378);
}

#[test]
fn psg_latch_and_data_writes() {
    let mut psg = Sn76489::new(3_579_545, 44_100);
    psg.write(0x80 | 0x0E);
    psg.write(0x3F);
    assert_eq!(psg.period(0), 0x3FE);

    psg.write(0xD0 | 0x05);
    assert_eq!(psg.attenuation(2), 5);
    // Data byte after a volume latch updates the same register.
    psg.write(0x07);
    assert_eq!(psg.attenuation(2), 7);

    psg.reset();
    assert_eq!(psg.period(0), 0);
    assert_eq!(psg.attenuation(2), 0x0F);
}

#[test]
fn psg_is_silent_after_reset_and_respects_stereo_mask() {
    let mut psg = Sn76489::new(3_579_545, 44_100);
    assert_eq!(psg.frame(), (0.0, 0.0));

    psg.write(0x90); // channel 0 full volume, period 0 holds high
    let (l, r) = psg.frame();
    assert!(l > 0.0 && r > 0.0);

    psg.set_stereo(0x0F); // right only
    let (l, r) = psg.frame();
    assert_eq!(l, 0.0);
    assert!(r > 0.0);
}

#[test]
fn engine_walks_playing_fading_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "loop.vgm",
        &vgm_file(&looping_commands(), Some(LOOP_OFFSET), None),
    );
    let mut engine = engine_1s_fade();
    engine.load(&path).unwrap();
    assert_eq!(engine.state(), PlayState::Stopped);
    assert_eq!(engine.duration(), Duration::from_secs(3));

    engine.start().unwrap();
    let out = render_frames(&mut engine, 1);
    assert!(out[0] > 0.0, "first frame applies the volume write");
    assert_eq!(engine.state(), PlayState::Playing);

    // Intro plus both loop passes.
    render_frames(&mut engine, 88_200);
    assert_eq!(engine.state(), PlayState::Fading);
    assert_eq!(engine.current_loop(), 2);

    render_frames(&mut engine, 44_100);
    assert!(engine.is_finished());
    assert_eq!(engine.state(), PlayState::Stopped);
    assert_eq!(engine.position(), engine.duration());

    let out = render_frames(&mut engine, 16);
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn engine_plays_end_silence_for_non_looping_songs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(&dir, "once.vgm", &vgm_file(&[0x61, 0x44, 0xAC, 0x66], None, None));
    let mut engine = engine_1s_fade();
    engine.load(&path).unwrap();
    engine.start().unwrap();

    render_frames(&mut engine, 44_110);
    assert_eq!(engine.state(), PlayState::Playing);
    assert!(!engine.is_finished());
    assert_eq!(engine.position(), Duration::from_secs(1));

    render_frames(&mut engine, 22_050);
    assert!(engine.is_finished());
    assert_eq!(engine.state(), PlayState::Stopped);
}

#[test]
fn non_looping_song_stops_with_default_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(&dir, "jingle.vgm", &vgm_file(&[0x61, 0x44, 0xAC, 0x66], None, None));
    let mut engine = VgmEngine::default();
    engine.load(&path).unwrap();
    engine.start().unwrap();

    render_frames(&mut engine, 44_100 * 30);
    assert!(engine.is_finished());
    assert_eq!(engine.state(), PlayState::Stopped);
    assert_eq!(engine.position(), Duration::from_secs(1));
}

#[test]
fn engine_seek_clamps_to_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "loop.vgm",
        &vgm_file(&looping_commands(), Some(LOOP_OFFSET), None),
    );
    let mut engine = engine_1s_fade();
    engine.load(&path).unwrap();
    engine.start().unwrap();

    engine.seek(Duration::from_millis(1600));
    assert_eq!(engine.position(), Duration::from_millis(1600));
    assert_eq!(engine.current_loop(), 1);

    engine.seek(Duration::from_secs(100));
    assert_eq!(engine.position(), engine.duration());

    engine.seek(Duration::ZERO);
    assert_eq!(engine.position(), Duration::ZERO);
    assert_eq!(engine.current_loop(), 0);
}

#[test]
fn engine_pause_holds_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "loop.vgm",
        &vgm_file(&looping_commands(), Some(LOOP_OFFSET), None),
    );
    let mut engine = engine_1s_fade();
    engine.load(&path).unwrap();
    engine.start().unwrap();
    render_frames(&mut engine, 4_410);

    engine.pause();
    assert_eq!(engine.state(), PlayState::Paused);
    let before = engine.position();
    let out = render_frames(&mut engine, 4_410);
    assert!(out.iter().all(|s| *s == 0.0));
    assert_eq!(engine.position(), before);

    engine.resume();
    assert_eq!(engine.state(), PlayState::Playing);
    render_frames(&mut engine, 4_410);
    assert!(engine.position() > before);
}

#[test]
fn engine_stop_and_render_are_safe_without_a_track() {
    let mut engine = VgmEngine::default();
    engine.stop();
    engine.pause();
    engine.seek(Duration::from_secs(3));
    assert!(matches!(engine.start(), Err(Error::NoTrack)));
    assert_eq!(engine.state(), PlayState::Stopped);
    assert_eq!(engine.position(), Duration::ZERO);
    assert!(engine.track().is_none());

    let mut out = [1.0f32; 8];
    assert_eq!(engine.render(&mut out), 4);
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn engine_stop_rewinds_and_failed_load_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "loop.vgm",
        &vgm_file(&looping_commands(), Some(LOOP_OFFSET), None),
    );
    let mut engine = engine_1s_fade();
    engine.load(&path).unwrap();
    engine.start().unwrap();
    render_frames(&mut engine, 1_000);
    engine.stop();
    assert_eq!(engine.state(), PlayState::Stopped);
    assert_eq!(engine.position(), Duration::ZERO);
    assert!(engine.track().is_some());

    engine.start().unwrap();
    let bad = write_temp(&dir, "bad.vgm", b"garbage");
    assert!(engine.load(&bad).is_err());
    assert_eq!(engine.track().map(|t| t.path.clone()), Some(path));
    assert_eq!(engine.state(), PlayState::Playing);
}
