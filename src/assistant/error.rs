//! Assistant error types

use thiserror::Error;

/// Errors that can occur when asking the assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No API credential was configured
    #[error("Missing API credential")]
    MissingCredential,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Remote service answered but without a usable reply
    #[error("Empty reply from service")]
    EmptyReply,

    #[error("Request timeout")]
    Timeout,

    #[error("Service unavailable")]
    Unavailable,
}

impl AssistantError {
    /// Classify a reqwest error the way the rest of the crate does
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AssistantError::Timeout
        } else if e.is_connect() {
            AssistantError::Unavailable
        } else {
            AssistantError::Request(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssistantError::ApiError {
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: bad key");
        assert_eq!(
            AssistantError::MissingCredential.to_string(),
            "Missing API credential"
        );
    }
}
