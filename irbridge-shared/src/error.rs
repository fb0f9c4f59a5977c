use std::io;

/// Errors from the serial link. All of these end the bridge loop.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("link I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended while waiting for a frame header.
    #[error("link closed")]
    Closed,

    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

/// Payload decode errors. Reported as diagnostics, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty frame")]
    Empty,

    #[error("{kind} payload truncated ({len} bytes)")]
    Truncated { kind: &'static str, len: usize },

    #[error("sample data has odd length ({len} bytes)")]
    OddSampleBytes { len: usize },
}

/// Errors while building or loading a code book.
#[derive(Debug, thiserror::Error)]
pub enum CodeBookError {
    #[error("code book I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("code book parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate code name {0:?}")]
    DuplicateName(String),

    #[error("code {0:?} has no samples")]
    EmptyCode(String),

    #[error("code {name:?} has {count} samples (max {max})")]
    TooLong {
        name: String,
        count: usize,
        max: usize,
    },

    #[error("unknown code {0:?}")]
    UnknownCode(String),
}
