//! Error types for the CyberGuard chat core.
//!
//! Messages are shown to the user verbatim inside an error bubble, so they are
//! written as sentences rather than as terse diagnostics.

/// Top-level error type for the assistant core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Rejected user input (empty, too long, bad name).
    #[error("{0}")]
    Validation(String),

    /// No task with the given id.
    #[error("Task with ID {0} not found.")]
    TaskNotFound(String),

    /// Quiz controller misuse (already running, nothing running, bad index).
    #[error("{0}")]
    Quiz(String),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// A shared lock was poisoned by a panicking holder.
    #[error("internal state unavailable: {0}")]
    StatePoisoned(&'static str),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CoreError>;
