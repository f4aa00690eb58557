use thiserror::Error;

use shared::error::AppError;

use crate::auth::JwtError;
use crate::storage::StorageError;

/// Errors that stop the server from starting or serving
///
/// Request-level failures are `AppError` responses, never `ServerError`.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] JwtError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Admin seeding failed: {0}")]
    Seed(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
