//! Decode/playback engine.
//!
//! `Engine` is the contract the audio facade drives; `VgmEngine` is the
//! built-in implementation. Every supported file is parsed into a
//! normalized [`song::Song`] event stream and rendered through an SN76489
//! model. Writes to other sound chips keep their timing but produce no sound.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

mod bytes;
mod dro;
mod gd3;
mod gym;
mod player;
mod psg;
mod s98;
mod song;
mod vgm;

pub use player::VgmEngine;

/// Native timebase of every parsed event stream (VGM samples per second).
pub const SONG_RATE: u32 = 44_100;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_LOOP_COUNT: u32 = 2;
pub const DEFAULT_FADE_MS: u64 = 4000;
pub const DEFAULT_END_SILENCE_MS: u64 = 1000;

/// File extensions the engine accepts (lowercase, without dot).
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["vgm", "vgz", "s98", "dro", "gym"];

/// Return true if `path` has one of the supported extensions (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// The playback state reported by an engine.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
    /// Playing the final fade-out after the last loop.
    Fading,
}

impl PlayState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Fading => "Fading",
        }
    }

    /// Playing or fading out; the states a natural track end comes from.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Playing | Self::Fading)
    }
}

/// A sound chip used by a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipInfo {
    /// Chip name, e.g. "YM2612".
    pub name: String,
    /// Emulation core, "PSG" for the built-in SN76489 or "silent".
    pub core: String,
}

impl ChipInfo {
    pub(crate) fn new(name: &str, core: &str) -> Self {
        Self {
            name: name.to_string(),
            core: core.to_string(),
        }
    }
}

/// Metadata for one file, read without touching any playback session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub title: String,
    pub game: String,
    pub system: String,
    pub composer: String,
    pub date: String,
    pub vgm_by: String,
    pub notes: String,
    /// e.g. "VGM 1.71", "S98 v3".
    pub format: String,
    /// Total duration including loops and fade.
    pub duration: Duration,
    /// Position where the loop section begins.
    pub loop_point: Duration,
    pub has_loop: bool,
    pub chips: Vec<ChipInfo>,
}

/// Contract between the audio facade and a decoder.
///
/// Lifecycle calls are serialized by the facade. `render` produces
/// interleaved stereo frames and writes silence whenever nothing plays.
pub trait Engine: Send {
    /// Load `path`, replacing any previous session. On error the previous
    /// session is left untouched.
    fn load(&mut self, path: &Path) -> Result<()>;
    fn start(&mut self) -> Result<()>;
    /// Stop playback. Safe to call with nothing loaded.
    fn stop(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Seek to an absolute position, clamped to `[0, duration]`.
    fn seek(&mut self, pos: Duration);
    /// Fill `out` with interleaved stereo samples; returns frames written.
    fn render(&mut self, out: &mut [f32]) -> usize;
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    fn current_loop(&self) -> u32;
    fn loop_count(&self) -> u32;
    fn is_finished(&self) -> bool;
    fn state(&self) -> PlayState;
    fn track(&self) -> Option<&TrackInfo>;
}

/// Read metadata for `path` with default loop and fade settings.
pub fn read_track_info(path: &Path) -> Result<TrackInfo> {
    let song = song::load(path)?;
    Ok(song.track_info(DEFAULT_LOOP_COUNT, Duration::from_millis(DEFAULT_FADE_MS)))
}

pub(crate) fn unsupported(path: &Path) -> Error {
    Error::UnsupportedFormat(path.display().to_string())
}

#[cfg(test)]
mod tests;
