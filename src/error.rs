//! Error types shared by the engine, library and audio layers.

/// Error type for loading, decoding and playing tracks.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed file data
    #[error("Parse error: {0}")]
    Parse(String),

    /// File type the engine cannot play
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Operation needs a loaded track
    #[error("No track loaded")]
    NoTrack,

    /// Audio output could not be opened or is gone
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// The audio thread is no longer listening
    #[error("Audio thread is not running")]
    ChannelClosed,
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
