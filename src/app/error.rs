//! Typed failure kinds surfaced by every boundary operation.
//!
//! Data-layer and storage failures are converted locally into one of
//! these kinds with a message; nothing propagates to the caller as an
//! unhandled fault, and nothing is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// No matching record or column.
    #[error("{0}")]
    NotFound(String),

    /// Structural mutation rejected or failed. `failed` distinguishes a
    /// rejected request from an alteration the engine refused.
    #[error("{message}")]
    Schema { message: String, failed: bool },

    /// Data-layer failure during read/write.
    #[error("{0}")]
    Persistence(String),

    /// File write/read failure.
    #[error("{0}")]
    Storage(String),

    /// Bad credentials or token.
    #[error("{0}")]
    Auth(String),
}

impl ServiceError {
    pub fn schema_rejected(message: impl Into<String>) -> Self {
        ServiceError::Schema {
            message: message.into(),
            failed: false,
        }
    }

    pub fn schema_failed(message: impl Into<String>) -> Self {
        ServiceError::Schema {
            message: message.into(),
            failed: true,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Persistence(e.to_string())
    }
}
