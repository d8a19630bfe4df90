//! Error types shared by the sync engine and the command line front-end.
//!
//! The `SyncError` enum unifies the failure cases of persistence, JSON encoding,
//! remote I/O, input validation and lock handling, allowing crates to propagate a
//! single error type. Most of them are recovered close to where they happen (a failed
//! fetch becomes an empty batch, a corrupt slot becomes an empty collection); the ones
//! that reach a caller are never fatal to the process.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the workspace crates.
#[derive(Error, Debug)]
pub enum SyncError {
    /// I/O error originating from the persistence slot or the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Transport or HTTP status failure while talking to the remote quote source.
    #[error("Remote error: {0}")]
    Remote(String),

    /// A local add was rejected before reaching the store. Carries the user-facing message.
    #[error("{0}")]
    Validation(String),

    /// A record with this id is already stored.
    #[error("Duplicate quote id: {0}")]
    DuplicateId(u64),

    /// No id above the largest stored one is left for a new local record.
    #[error("No quote ids left above {0}")]
    IdsExhausted(u64),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for SyncError {
    fn from(err: PoisonError<T>) -> Self {
        SyncError::MutexLock(err.to_string())
    }
}
