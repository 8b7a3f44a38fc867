use super::*;
use crate::config::Settings;
use std::fs;

#[test]
fn restore_leaves_the_alternate_screen() {
    let mut out = Vec::new();
    restore_terminal(&mut out).unwrap();
    let written = String::from_utf8(out).unwrap();
    assert!(written.contains("\x1b[?1049l"), "{written:?}");
}

#[test]
fn library_root_prefers_a_directory_argument() {
    let dir = tempfile::tempdir().unwrap();
    let configured = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.library.root = Some(configured.path().to_path_buf());

    assert_eq!(
        library_root(Some(dir.path()), &settings),
        Some(dir.path().to_path_buf())
    );

    let file = dir.path().join("song.vgm");
    fs::write(&file, b"x").unwrap();
    assert_eq!(
        library_root(Some(&file), &settings),
        Some(configured.path().to_path_buf())
    );

    settings.library.root = Some(dir.path().join("missing"));
    assert_eq!(library_root(None, &settings), None);
}
