//! Uniform response envelope.

use serde::{Deserialize, Serialize};

/// Envelope returned by every handler, on success and on failure.
///
/// `data` and `count` serialize as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying a single record.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            count: None,
        }
    }

    /// A failed response with no payload.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            count: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A successful response carrying a list and its length.
    pub fn list(message: impl Into<String>, data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            count: Some(count),
        }
    }
}
