//! Error type for the replay-reconstruction pipeline.
//!
//! Every failure aborts the run: there is no retry or skip-and-continue,
//! and nothing is persisted after an error.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while rebuilding or persisting replay buffers.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The trajectory input directory does not exist.
    #[error("trajectory directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Reading or writing a file failed.
    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record or buffer-artifact file could not be decoded.
    #[error("failed to decode {path}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record declares more valid steps than one of its arrays holds.
    #[error(
        "record {id}: valid_count {declared} exceeds the {array} array length {available}"
    )]
    ValidCountOutOfRange {
        id: String,
        array: &'static str,
        declared: usize,
        available: usize,
    },

    /// A buffer could not be serialized for persistence.
    #[error("failed to encode buffer for {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configured buffer capacity is unusable.
    #[error("replay buffer capacity must be positive")]
    InvalidCapacity,
}
