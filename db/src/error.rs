//! Error types for registry, fingerprint and configuration operations.
//!
//! Provides a unified error type covering I/O, serialization, command
//! compilation, malformed command documents and fingerprint bookkeeping.

use std::path::PathBuf;

use slash_commands_core::CompileError;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The command schema failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A command document is structurally wrong (e.g. both `data` and `wire`).
    #[error("invalid command document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// `commit` was called for a command with no pending stale hash.
    #[error("no stale fingerprint recorded for command `{0}`")]
    StaleCommitMismatch(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
