use std::path::Path;
use std::time::Instant;

use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::engine::{is_supported, read_track_info};
use crate::error::{Error, Result};

use super::model::{Library, Track};
use super::order::order_game;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Index every supported file under `root`.
///
/// Entries that cannot be read are skipped; only a missing or unreadable
/// root is an error.
pub fn scan(root: &Path, settings: &LibrarySettings) -> Result<Library> {
    if !root.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("library root {} is not a directory", root.display()),
        )));
    }
    std::fs::read_dir(root)?;

    let started = Instant::now();
    log::info!("scanning library at {}", root.display());
    let mut library = Library::new(root);
    let mut skipped = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                log::debug!("skipping unreadable entry: {err}");
                None
            }
        })
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported(path) {
            continue;
        }
        match read_track_info(path) {
            Ok(info) => library.insert(Track::from_info(&info)),
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                skipped += 1;
            }
        }
    }

    for game in library.games_mut() {
        order_game(game);
    }

    log::info!(
        "library scan finished: {} tracks ({} skipped) in {:?}",
        library.track_count(),
        skipped,
        started.elapsed()
    );
    Ok(library)
}
