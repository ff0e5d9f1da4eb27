//! Error types for catalog fetches and controller calls.

use moviepager_core::AppError;
use thiserror::Error;

/// Failure of a single remote catalog request.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Catalog returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Transport(format!("request timed out: {}", value))
        } else {
            Self::Transport(value.to_string())
        }
    }
}

/// Errors returned by [`crate::SyncController`] calls.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Page numbers start at 1 (got {0})")]
    InvalidPage(u32),

    #[error("Sync worker is not running")]
    WorkerStopped,

    #[error("Failed to start sync worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] AppError),
}
