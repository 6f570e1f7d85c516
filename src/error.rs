//! Error types for the tailer library.

use thiserror::Error;

/// The main error type for tailer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when reading, seeking or opening the followed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// A scan window of zero bytes can never make progress.
    #[error("Invalid read size: {read_size} (must be at least 1)")]
    InvalidReadSize { read_size: usize },

    /// The requested text encoding label is not known.
    #[error("Unknown encoding: {label}")]
    UnknownEncoding { label: String },

    /// A followed line could not be decoded under the strict policy.
    #[error("Failed to decode {} bytes as {encoding}", .bytes.len())]
    Decode {
        encoding: &'static str,
        bytes: Vec<u8>,
    },
}

/// A convenient Result type for tailer operations.
pub type Result<T> = std::result::Result<T, Error>;
