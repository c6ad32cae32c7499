//! Error types for the session store.
//!
//! The object store and repositories absorb [`StoreError`] locally; only the purge path
//! returns it. The lifecycle use cases are the only layer that surfaces errors to callers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::record::Collection;

/// Failures of the persistent object store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store failed to initialize and runs as a no-op.
    #[error("object store is unavailable")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt {collection} record '{id}': {reason}")]
    CorruptRecord {
        collection: Collection,
        id: String,
        reason: String,
    },

    #[error("schema version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("timed out opening object store after {0:?}")]
    OpenTimeout(Duration),

    /// The multi-collection session delete was rolled back.
    #[error("failed to purge session {session_tag}: {source}")]
    PurgeFailed {
        session_tag: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Failures of a key-value register backend.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("register I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("register file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to replace register file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("register lock poisoned")]
    Poisoned,
}

/// The current session tag could not be used.
#[derive(Debug, Error)]
pub enum SessionTagError {
    #[error("no active session")]
    Missing,

    #[error("malformed session tag '{0}'")]
    Malformed(String),

    #[error(transparent)]
    Register(#[from] RegisterError),
}

/// Integrity violations detected while restoring a session.
///
/// A half-restored editing session is never returned; any of these aborts the restore.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestoreError {
    #[error("video {video_id} has no transcript")]
    MissingTranscript { video_id: String },

    #[error("video {video_id} has no highlight")]
    MissingHighlight { video_id: String },

    #[error("highlight {highlight_id} selects unknown sentence {sentence_id}")]
    UnknownSelection {
        highlight_id: String,
        sentence_id: String,
    },
}

/// The transactional session purge failed; the durable purge intent is left in place.
#[derive(Debug, Error)]
#[error("cleanup of session {session_tag} failed: {source}")]
pub struct CleanupError {
    pub session_tag: String,
    #[source]
    pub source: StoreError,
}

/// Failures of the application-start sequence.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Cleanup(#[from] CleanupError),

    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Configuration load/validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
