//! Error kinds returned by the GXD engine.
//!
//! A flat enum, a manual `Display`, and `From` impls for the handful of
//! third-party errors that cross into our code — no `thiserror` derive,
//! matching the rest of this codebase's hand-written error style.

use std::fmt;

/// The primary error type for every operation in this crate.
#[derive(Debug)]
pub enum GxdError {
    /// Underlying read/write failure.
    Io(std::io::Error),
    /// Opening or closing magic did not match `GXDINC`.
    BadMagic,
    /// Footer missing fields, invalid JSON, impossible length, or broken
    /// block adjacency.
    CorruptFooter(String),
    /// Codec tag unknown, or its library unavailable at runtime.
    UnsupportedAlgorithm(String),
    /// Codec reported malformed compressed input.
    Codec(String),
    /// Decoded block's digest differs from its descriptor.
    BlockHashMismatch { id: u64 },
    /// Full-decompress digest differs from the footer's `global_hash`.
    GlobalHashMismatch,
    /// Caller-supplied argument out of range (`block_size <= 0`, negative
    /// offset, `threads` outside `[1, 128]`, ...).
    InvalidArgument(String),
}

impl fmt::Display for GxdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GxdError::Io(e) => write!(f, "I/O error: {e}"),
            GxdError::BadMagic => write!(f, "bad magic: expected GXDINC"),
            GxdError::CorruptFooter(msg) => write!(f, "corrupt footer: {msg}"),
            GxdError::UnsupportedAlgorithm(tag) => write!(f, "unsupported algorithm: {tag}"),
            GxdError::Codec(msg) => write!(f, "codec error: {msg}"),
            GxdError::BlockHashMismatch { id } => write!(f, "block hash mismatch for block {id}"),
            GxdError::GlobalHashMismatch => write!(f, "global hash mismatch"),
            GxdError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for GxdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GxdError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GxdError {
    fn from(err: std::io::Error) -> Self {
        GxdError::Io(err)
    }
}

impl From<serde_json::Error> for GxdError {
    fn from(err: serde_json::Error) -> Self {
        GxdError::CorruptFooter(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GxdError>;
