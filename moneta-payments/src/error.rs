//! Error types for the payment SDK

use moneta_http::HttpClientError;
use thiserror::Error;

/// Payment SDK error types
///
/// Local form validation is not an error: components report it through
/// `is_valid()`.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Server answered 404 for the requested resource
    #[error("Resource not found: {url}")]
    ResourceNotFound {
        /// URL that was requested
        url: String,
    },

    /// Server answered with a status code the protocol does not define
    #[error("Unexpected response {status} from {url}: {message}")]
    Protocol {
        /// HTTP status code
        status: u16,
        /// URL that was requested
        url: String,
        /// Diagnostic payload returned by the server
        message: String,
    },

    /// Saved state or process state is inconsistent
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A form component was described with contradictory constraints
    #[error("Invalid component: {0}")]
    Construction(String),

    /// A request could not be built or was rejected as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Access token is missing, expired or revoked
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Access token lacks the scope for the operation
    #[error("Insufficient scope: {0}")]
    InsufficientScope(String),

    /// Transport failure, passed through untouched
    #[error("Network error: {0}")]
    Network(#[from] HttpClientError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

impl PaymentError {
    /// Build a protocol error from an unexpected response.
    pub fn protocol(response: &moneta_http::Response) -> Self {
        PaymentError::Protocol {
            status: response.status().as_u16(),
            url: response.url().to_string(),
            message: response.text_lossy(),
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ResourceNotFound { .. } => Some(404),
            Self::Protocol { status, .. } => Some(*status),
            Self::Network(e) => e.status_code(),
            _ => None,
        }
    }
}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_keeps_diagnostics() {
        let response = moneta_http::Response::new(
            moneta_http::StatusCode::INTERNAL_SERVER_ERROR,
            moneta_http::HeaderMap::new(),
            "technical_error",
            url::Url::parse("https://yoomoney.ru/api/showcase/submit").unwrap(),
        );

        let err = PaymentError::protocol(&response);
        assert_eq!(err.status_code(), Some(500));
        let text = err.to_string();
        assert!(text.contains("technical_error"));
        assert!(text.contains("/showcase/submit"));
    }
}
