//! Error types for the battle admin backend.
//!
//! Defines the main error enum used throughout the service and how each
//! variant surfaces to HTTP callers.

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for backend operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed, or a required field failed validation.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Configuration errors (missing connection string, invalid config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Stored procedure errors (binding, execution, decoding).
    #[error("Procedure error: {0}")]
    Procedure(String),

    /// A procedure that should return a row returned none.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Creates a bad request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a procedure error with the given message.
    pub fn procedure(msg: impl Into<String>) -> Self {
        Self::Procedure(msg.into())
    }

    /// Creates an empty result error with the given message.
    pub fn empty_result(msg: impl Into<String>) -> Self {
        Self::EmptyResult(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "Bad Request",
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
            Self::Procedure(_) => "Procedure Error",
            Self::EmptyResult(_) => "Empty Result",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message placed in the response envelope.
    ///
    /// Request, configuration and empty-result errors carry a message written
    /// for the caller. Database and internal failures are reported with their
    /// raw text.
    pub fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::Config(msg) | Self::EmptyResult(msg) => msg.clone(),
            Self::Connection(msg) | Self::Procedure(msg) | Self::Internal(msg) => {
                format!("Internal server error: {msg}")
            }
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
