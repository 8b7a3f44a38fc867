//! Audio-related small types and handles.
//!
//! Commands sent to the audio thread, the events it reports back, and the
//! periodic playback snapshot fanned out to subscribers.

use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::engine::{Engine, PlayState, TrackInfo};
use crate::error::Error;

#[derive(Debug)]
pub enum AudioCmd {
    /// Load `path` into the engine and start it.
    Play { path: PathBuf },
    /// Stop playback immediately.
    Stop,
    Pause,
    Resume,
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Set the output volume (0.0 to 2.0).
    SetVolume(f32),
    /// Quit the audio thread.
    Quit,
}

/// Outcome of an `AudioCmd::Play`.
#[derive(Debug)]
pub enum AudioEvent {
    /// `session` matches the `session` of every snapshot taken afterwards.
    Started { info: TrackInfo, session: u64 },
    Failed { path: PathBuf, error: Error },
}

/// Whether the audio thread opens a real output device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// The system default device through rodio.
    Device,
    /// No device; the engine is driven by commands only.
    Null,
}

/// Options for [`super::AudioPlayer::with_engine`].
#[derive(Debug, Copy, Clone)]
pub struct AudioOptions {
    pub sample_rate: u32,
    /// Interval between playback snapshots.
    pub tick: Duration,
    pub volume: f32,
    pub output: OutputMode,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
/// Playback state sampled from the engine by the ticker.
pub struct PlaybackSnapshot {
    pub state: PlayState,
    pub position: Duration,
    pub duration: Duration,
    /// Completed passes through the loop section.
    pub current_loop: u32,
    /// Configured loop passes before the fade.
    pub total_loops: u32,
    pub has_loop: bool,
    pub volume: f32,
    /// Number of tracks started so far; tells snapshots of one track from
    /// those of the next.
    pub session: u64,
}

impl PlaybackSnapshot {
    /// Fraction of the track played, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.position)
    }
}

pub type SharedEngine = Arc<Mutex<Box<dyn Engine>>>;
pub type VolumeHandle = Arc<Mutex<f32>>;
/// Bumped under the engine lock each time a track starts.
pub type SessionCounter = Arc<AtomicU64>;

/// Lock the engine, recovering it if a previous holder panicked.
pub(super) fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, Box<dyn Engine>> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(super) fn read_volume(volume: &VolumeHandle) -> f32 {
    *volume.lock().unwrap_or_else(PoisonError::into_inner)
}
