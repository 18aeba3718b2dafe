//! Error types for registration calls and sync passes.

use slash_commands_db::DatabaseError;
use thiserror::Error;

/// A failed registration call for one scope.
///
/// Client errors are reported per scope in a
/// [`SyncReport`](crate::SyncReport) and never abort a sync pass.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote API rejected the call or could not be reached.
    #[error("registration call failed: {0}")]
    Remote(String),

    /// File I/O failure while exporting a batch.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A batch could not be serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors that end a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The readiness trigger was dropped before it fired.
    #[error("connection was closed before it became ready")]
    NeverReady,

    /// Fingerprints could not be persisted.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Convenience alias for results with [`SyncError`].
pub type Result<T> = std::result::Result<T, SyncError>;
