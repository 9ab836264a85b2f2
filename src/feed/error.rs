//! Entry store error types

use thiserror::Error;

/// Errors that can occur talking to an entry store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No endpoint configured for the remote store
    #[error("Entry store endpoint not configured")]
    NotConfigured,

    /// SQLite failure in the local table
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem failure opening the table
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored row could not be decoded
    #[error("Corrupt row: {0}")]
    Corruption(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// HTTP transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote store answered with a non-success status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Push channel failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Push channel refused the subscription
    #[error("Subscription rejected: {0}")]
    SubscriptionRejected(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for StoreError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        StoreError::WebSocket(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StoreError::NotConfigured.to_string(),
            "Entry store endpoint not configured"
        );
        let err = StoreError::ApiError {
            status: 401,
            message: "missing apikey".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: missing apikey");
    }
}
