//! Application model: everything the view draws and the reducer updates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::PlaybackSnapshot;
use crate::browser::FileBrowser;
use crate::config::Settings;
use crate::engine::TrackInfo;
use crate::library::{LibBrowser, Track};
use crate::playlist::{LoopMode, Playlist};

use super::update::Effect;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Browser,
    Playlist,
}

/// A playback start that has been requested but not yet confirmed.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Transition {
    #[default]
    Idle,
    Pending { index: usize, track: Track },
}

/// Footer error with the generation it was raised under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    pub stamp: u64,
}

/// Left panel content.
#[derive(Clone, Debug)]
pub enum LeftPanel {
    Scanning { root: PathBuf },
    Library(LibBrowser),
    Files(FileBrowser),
}

impl LeftPanel {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Scanning { .. } | Self::Library(_) => "Library",
            Self::Files(_) => "Files",
        }
    }

    pub fn is_library(&self) -> bool {
        !matches!(self, Self::Files(_))
    }
}

/// Settings the reducer consults.
#[derive(Copy, Clone, Debug)]
pub struct Options {
    pub seek_seconds: i64,
    pub error_timeout: Duration,
    pub library_width_percent: u16,
}

impl From<&Settings> for Options {
    fn from(s: &Settings) -> Self {
        Self {
            seek_seconds: i64::try_from(s.playback.seek_seconds).unwrap_or(i64::MAX),
            error_timeout: Duration::from_millis(s.ui.error_timeout_ms),
            library_width_percent: s.ui.library_width_percent,
        }
    }
}

#[derive(Clone, Debug)]
pub struct App {
    pub focus: Focus,
    pub left: LeftPanel,
    pub playlist: Playlist,
    /// Last engine snapshot, with the reducer's own corrections applied.
    pub playback: PlaybackSnapshot,
    /// Session of the last confirmed start; snapshots from other sessions are stale.
    pub session: u64,
    /// Committed "now playing" track and its full metadata.
    pub current_track: Option<Track>,
    pub current_info: Option<TrackInfo>,
    pub transition: Transition,
    pub volume: f32,
    pub error: Option<ErrorBanner>,
    pub(super) error_seq: u64,
    pub show_help: bool,
    /// Terminal size (columns, rows).
    pub size: (u16, u16),
    /// False once the snapshot stream has closed.
    pub snapshots_open: bool,
    pub options: Options,
}

impl App {
    pub fn new(settings: &Settings, left: LeftPanel) -> Self {
        Self {
            focus: Focus::Browser,
            left,
            playlist: Playlist::new(LoopMode::from(settings.playback.loop_mode)),
            playback: PlaybackSnapshot {
                total_loops: settings.playback.loop_count,
                volume: settings.playback.volume,
                ..PlaybackSnapshot::default()
            },
            session: 0,
            current_track: None,
            current_info: None,
            transition: Transition::Idle,
            volume: settings.playback.volume,
            error: None,
            error_seq: 0,
            show_help: settings.ui.show_help_on_start,
            size: (80, 24),
            snapshots_open: true,
            options: Options::from(settings),
        }
    }

    /// Initial model plus the effects that populate the left panel: a scan
    /// when a library root is known, a directory listing otherwise.
    pub fn start(settings: &Settings, library_root: Option<PathBuf>, cwd: &Path) -> (Self, Vec<Effect>) {
        match library_root {
            Some(root) => {
                let effect = Effect::ScanLibrary(root.clone());
                (Self::new(settings, LeftPanel::Scanning { root }), vec![effect])
            }
            None => {
                let browser = FileBrowser::new(cwd);
                let effect = Effect::ReadDir {
                    dir: browser.dir().to_path_buf(),
                    show_hidden: browser.show_hidden(),
                };
                (Self::new(settings, LeftPanel::Files(browser)), vec![effect])
            }
        }
    }

    /// True while a playback start is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.transition, Transition::Pending { .. })
    }

    pub fn pending_index(&self) -> Option<usize> {
        match &self.transition {
            Transition::Pending { index, .. } => Some(*index),
            Transition::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.playback.state.is_running()
    }

    /// Rows moved by page up/down.
    pub fn page_size(&self) -> usize {
        usize::from(self.size.1.saturating_sub(12)).max(1)
    }
}
