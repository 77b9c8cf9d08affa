//! Remote call error types

use thiserror::Error;

use crate::wire::BackendError;

/// Classified failure of a remote call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Server error: {}", join_messages(.0))]
    Domain(Vec<BackendError>),

    #[error("Network error: {message}")]
    Network { status: Option<u16>, message: String },
}

fn join_messages(errors: &[BackendError]) -> String {
    errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join(", ")
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the backend reported errors inside a successful response
    pub fn is_domain(&self) -> bool {
        matches!(self, ApiError::Domain(_))
    }

    /// Whether trying again without changing the request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Server(_) => true,
            ApiError::Network { .. } => true,
            ApiError::Authentication(_) => false,
            ApiError::InvalidRequest(_) => false,
            ApiError::Domain(_) => false,
        }
    }

    /// Raw HTTP status for unexpected responses
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Message suitable for showing to the traveler
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ErrorCode;

    fn item(message: &str) -> BackendError {
        BackendError {
            code: ErrorCode::Text("E".to_string()),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_domain_message_joins_items() {
        let err = ApiError::Domain(vec![item("No destinations match"), item("Budget too low")]);
        assert_eq!(err.user_message(), "Server error: No destinations match, Budget too low");
        assert!(err.is_domain());
    }

    #[test]
    fn test_is_retryable() {
        assert!(ApiError::Server("Backend server error".to_string()).is_retryable());
        assert!(ApiError::network("connection reset").is_retryable());
        assert!(!ApiError::Authentication("Invalid API key".to_string()).is_retryable());
        assert!(!ApiError::InvalidRequest("Invalid request data".to_string()).is_retryable());
    }

    #[test]
    fn test_status() {
        let err = ApiError::Network {
            status: Some(418),
            message: "Unexpected response: 418".to_string(),
        };
        assert_eq!(err.status(), Some(418));
        assert_eq!(ApiError::network("timeout").status(), None);
    }
}
