//! Audio facade.
//!
//! `AudioPlayer` owns the engine behind a mutex, an audio thread that
//! executes `AudioCmd`s and feeds the output device, and a ticker that
//! samples the engine and fans `PlaybackSnapshot`s out to subscribers.

mod player;
mod source;
mod thread;
mod ticker;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, AudioEvent, PlaybackSnapshot};
