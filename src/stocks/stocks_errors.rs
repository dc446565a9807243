use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StockError>;

/// Custom error type for stock catalog operations
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl From<DieselError> for StockError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StockError::NotFound("Stock not found".to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StockError::AlreadyExists(info.message().to_string())
            }
            _ => StockError::DatabaseError(err.to_string()),
        }
    }
}
