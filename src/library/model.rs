use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::TrackInfo;

pub const UNKNOWN_SYSTEM: &str = "Unknown";

/// One playable file with the metadata shown in lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub game: String,
    pub system: String,
    pub composer: String,
    pub duration: Duration,
    /// 1-based position within its game, when known.
    pub track_number: Option<u32>,
}

impl Track {
    /// Build a track from engine metadata, filling empty fields from the path:
    /// the file stem as title, the parent directory as game.
    pub fn from_info(info: &TrackInfo) -> Self {
        let path = info.path.as_path();
        let title = non_empty(&info.title).unwrap_or_else(|| file_stem(path));
        let game = non_empty(&info.game).unwrap_or_else(|| parent_name(path));
        let system = non_empty(&info.system).unwrap_or_else(|| UNKNOWN_SYSTEM.to_string());
        Self {
            path: info.path.clone(),
            title,
            game,
            system,
            composer: info.composer.trim().to_string(),
            duration: info.duration,
            track_number: None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

pub(super) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Tracks under a root directory, grouped System → Game → Track.
///
/// Systems and games iterate in name order; tracks within a game keep the
/// order computed at scan time.
#[derive(Debug, Clone, Default)]
pub struct Library {
    root: PathBuf,
    systems: BTreeMap<String, BTreeMap<String, Vec<Track>>>,
    count: usize,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(super) fn insert(&mut self, track: Track) {
        self.systems
            .entry(track.system.clone())
            .or_default()
            .entry(track.game.clone())
            .or_default()
            .push(track);
        self.count += 1;
    }

    pub(super) fn games_mut(&mut self) -> impl Iterator<Item = &mut Vec<Track>> {
        self.systems.values_mut().flat_map(|games| games.values_mut())
    }

    pub fn systems(&self) -> Vec<&str> {
        self.systems.keys().map(String::as_str).collect()
    }

    pub fn games(&self, system: &str) -> Vec<&str> {
        self.systems
            .get(system)
            .map(|games| games.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn tracks(&self, system: &str, game: &str) -> &[Track] {
        self.systems
            .get(system)
            .and_then(|games| games.get(game))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every track, grouped by system and game in display order.
    pub fn all_tracks(&self) -> impl Iterator<Item = &Track> {
        self.systems
            .values()
            .flat_map(|games| games.values())
            .flatten()
    }

    pub fn track_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
