//! Error types for the harmonia core

use thiserror::Error;

/// Errors raised by the analysis, synthesis and chord modules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarmoniaError {
    /// Buffer length is not a power of two
    #[error("Invalid input: buffer length {len} is not a power of two")]
    InvalidInput { len: usize },

    /// Chord name could not be parsed or its suffix is not in the table
    #[error("Unknown chord: {0:?}")]
    UnknownChord(String),

    /// Autocorrelation has no interior local maximum
    #[error("No autocorrelation peak found")]
    NoPeakFound,

    /// Note number outside 0..=127
    #[error("Note out of range: {0}")]
    NoteOutOfRange(i32),

    /// The oscillator engine was dropped
    #[error("Oscillator command channel closed")]
    ChannelClosed,

    /// The oscillator command queue is full
    #[error("Oscillator command queue full")]
    QueueFull,

    /// Invalid settings value
    #[error("Invalid settings: {0}")]
    Settings(String),
}

/// Result type for harmonia core operations
pub type Result<T> = std::result::Result<T, HarmoniaError>;
