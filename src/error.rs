//! Error types for the automation worker.

use thiserror::Error;

/// The main error type for a dispatch run.
///
/// Every variant is terminal: the binary prints it and exits non-zero.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid payload: {0}")]
    Validation(String),

    #[error("Unknown or missing action in client_payload: {}", .0.as_deref().unwrap_or("<none>"))]
    UnknownAction(Option<String>),

    #[error("GitHub API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    /// HTTP status of an API failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized Result type for dispatch runs.
pub type Result<T> = std::result::Result<T, WorkerError>;
