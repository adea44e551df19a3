use thiserror::Error;

use crate::database::DatabaseError;

/// Failures raised by observers; any of them aborts the surrounding unit of work
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
