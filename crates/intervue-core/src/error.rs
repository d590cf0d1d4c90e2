//! Core error types for intervue-core.
//!
//! Three failure families exist and they resolve differently:
//! - [`SessionError`]: a command was issued in a state that forbids it.
//!   Surfaced synchronously to the caller, never swallowed.
//! - [`RestoreError`]: a persisted session failed the restoration validity
//!   check. Recoverable -- the session is discarded and a fresh one started.
//! - [`DatabaseError`] / [`ConfigError`]: storage-layer failures.
//!
//! Nothing here is fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionStatus;

/// Core error type for intervue-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Interview state-machine violations
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Persisted-session restoration failures
    #[error("Restore error: {0}")]
    Restore(#[from] RestoreError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Interview state-machine errors.
///
/// Every command on the engine is guarded by the current [`SessionStatus`];
/// a command arriving in the wrong state is a caller bug and is rejected
/// with one of these, never silently ignored.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Command issued in a state that forbids it
    #[error("'{command}' is not valid while the interview is {status}")]
    InvalidTransition {
        command: &'static str,
        status: SessionStatus,
    },

    /// Command requires an active session and none exists
    #[error("'{command}' requires an active interview")]
    NoActiveSession { command: &'static str },

    /// An interview cannot start without questions
    #[error("an interview needs at least one question")]
    EmptyQuestionList,

    /// A recorded time-spent value exceeds the question's budget
    #[error("time spent ({spent}s) exceeds the {limit}s budget for question {question_id}")]
    TimeBudget {
        question_id: String,
        spent: u64,
        limit: u64,
    },

    /// `time_up` called while the countdown is still running
    #[error("time is not up yet: {remaining}s remaining")]
    TimeNotUp { remaining: u64 },
}

/// Persisted-session restoration errors.
///
/// All of these mean "discard and start fresh", not "crash".
#[derive(Error, Debug)]
pub enum RestoreError {
    /// Last activity is older than the staleness threshold
    #[error("session {id} is stale: started {age_hours}h ago (limit {limit_hours}h)")]
    Stale {
        id: String,
        age_hours: i64,
        limit_hours: i64,
    },

    /// Status does not permit resumption (completed, not started, ...)
    #[error("session {id} is not resumable from status {status}")]
    NotResumable { id: String, status: SessionStatus },

    /// Structural invariant violated in the persisted data
    #[error("session {id} is malformed: {reason}")]
    Malformed { id: String, reason: String },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored value could not be (de)serialized
    #[error("Stored value is not valid JSON: {0}")]
    CorruptValue(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
