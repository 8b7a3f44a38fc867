use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vgmtui/config.toml` or `~/.config/vgmtui/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VGMTUI__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Library root. When unset, `~/VGM` is used if it exists.
    pub root: Option<PathBuf>,
    /// Whether to descend into hidden directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            include_hidden: false,
            follow_links: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How many times a looping track plays its loop section before fading.
    pub loop_count: u32,
    /// Fade-out length after the last loop (milliseconds).
    pub fade_ms: u64,
    /// Silence appended to non-looping tracks (milliseconds).
    pub end_silence_ms: u64,
    /// Initial volume, 0.0 to 2.0.
    pub volume: f32,
    /// Seconds to jump when seeking with `f` / `b`.
    pub seek_seconds: u64,
    /// Playlist loop mode on startup.
    pub loop_mode: LoopModeSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            loop_count: 2,
            fade_ms: 4000,
            end_silence_ms: 1000,
            volume: 1.0,
            seek_seconds: 5,
            loop_mode: LoopModeSetting::None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopModeSetting {
    #[serde(alias = "no-loop", alias = "no_loop", alias = "off")]
    None,
    #[serde(alias = "loop-one", alias = "loop_one", alias = "repeat-one")]
    One,
    #[serde(alias = "loop-all", alias = "loop_all", alias = "repeat-all")]
    All,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Interval between playback snapshots (milliseconds).
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// How long an error stays in the footer (milliseconds).
    pub error_timeout_ms: u64,
    /// Width of the left browser panel, in percent.
    pub library_width_percent: u16,
    /// Open the help popup on startup.
    pub show_help_on_start: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            error_timeout_ms: 5000,
            library_width_percent: 30,
            show_help_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter, overridden by `RUST_LOG`.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/vgmtui/vgmtui.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
