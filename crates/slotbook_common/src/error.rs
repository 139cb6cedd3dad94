// --- File: crates/slotbook_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type surfaced at the HTTP boundary.
///
/// Each crate keeps its own error enum and implements `From<CrateError> for SlotbookError`.
#[derive(Error, Debug)]
pub enum SlotbookError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authorization of an admin operation
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Malformed code, out-of-template slot or field constraint
    #[error("{0}")]
    ValidationError(String),

    /// Error occurred during a storage operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Slot already booked or duplicate code
    #[error("{0}")]
    ConflictError(String),

    /// Booking code unmatched
    #[error("{0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SlotbookError {
    fn status_code(&self) -> u16 {
        match self {
            SlotbookError::ParseError(_) => 400,
            SlotbookError::ConfigError(_) => 500,
            SlotbookError::AuthError(_) => 401,
            SlotbookError::ValidationError(_) => 400,
            SlotbookError::DatabaseError(_) => 500,
            SlotbookError::ConflictError(_) => 409,
            SlotbookError::NotFoundError(_) => 404,
            SlotbookError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for SlotbookError {
    fn from(err: serde_json::Error) -> Self {
        SlotbookError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for SlotbookError {
    fn from(err: std::io::Error) -> Self {
        SlotbookError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> SlotbookError {
    SlotbookError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> SlotbookError {
    SlotbookError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> SlotbookError {
    SlotbookError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> SlotbookError {
    SlotbookError::ConflictError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> SlotbookError {
    SlotbookError::InternalError(message.to_string())
}
