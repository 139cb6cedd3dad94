//! Error types for booking storage

use slotbook_common::SlotbookError;
use thiserror::Error;

/// Errors that can occur when working with a booking store
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the storage configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Reading or writing the bookings file failed
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The bookings document could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// No booking with the given code
    #[error("Booking not found: {0}")]
    NotFound(String),

    /// A booking with the same slot or code already exists
    #[error("{0}")]
    Duplicate(String),
}

impl DbError {
    pub fn duplicate_slot() -> Self {
        DbError::Duplicate("This slot has already been booked".to_string())
    }

    pub fn duplicate_code() -> Self {
        DbError::Duplicate("Booking code is already in use".to_string())
    }
}

impl From<DbError> for SlotbookError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => SlotbookError::NotFoundError("Booking not found".to_string()),
            DbError::Duplicate(message) => SlotbookError::ConflictError(message),
            DbError::ConfigError(message) => SlotbookError::ConfigError(message),
            other => SlotbookError::DatabaseError(other.to_string()),
        }
    }
}
