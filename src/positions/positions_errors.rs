use diesel::result::Error as DieselError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PositionError>;

/// Custom error type for position ledger operations
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Insufficient shares to sell. Available: {available}, requested: {requested}")]
    InsufficientShares { available: i32, requested: i32 },
}

impl From<DieselError> for PositionError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PositionError::NotFound("Position not found".to_string()),
            _ => PositionError::DatabaseError(err.to_string()),
        }
    }
}
