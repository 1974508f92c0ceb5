//! Error types for the estate client.
//!
//! Every call made through the session client resolves to [`ApiError`] on
//! failure. The variants mirror what a caller can do about the failure: an
//! HTTP status from the backend, a transport failure where no response was
//! received, or a local problem (decoding, storage, configuration).

use serde_json::Value;
use thiserror::Error;

/// The main error type for estate client operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request timed out before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// No response was received (connection refused, DNS, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A success response whose content does not fit the exchange, such as
    /// a login without tokens or an unknown outcome.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The request body could not be encoded. Nothing was sent.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The token store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias using [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an unexpected-response error.
    pub fn unexpected_response(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create an encode error.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Get the HTTP status if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check whether this is a 401 from the backend.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Check whether this is a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check whether no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transport(_))
    }

    /// Extract the backend's human-readable message, if any.
    ///
    /// The backend reports failures as `{"error": "..."}` or, for framework
    /// level rejections, `{"detail": "..."}`.
    pub fn error_message(&self) -> Option<String> {
        let Self::Http { body, .. } = self else {
            return None;
        };
        let value: Value = serde_json::from_str(body).ok()?;
        ["error", "detail", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = ApiError::http(503, "unavailable");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_unauthorized());

        assert_eq!(ApiError::Timeout.status(), None);
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::http(401, "").is_unauthorized());
        assert!(!ApiError::http(403, "").is_unauthorized());
        assert!(!ApiError::transport("refused").is_unauthorized());
    }

    #[test]
    fn test_transport_classification() {
        assert!(ApiError::Timeout.is_transport());
        assert!(ApiError::transport("dns").is_transport());
        assert!(!ApiError::http(500, "").is_transport());
        assert!(!ApiError::storage("disk").is_transport());
    }

    #[test]
    fn test_error_message() {
        let err = ApiError::http(400, r#"{"error": "Invalid OTP"}"#);
        assert_eq!(err.error_message().as_deref(), Some("Invalid OTP"));

        let err = ApiError::http(401, r#"{"detail": "Token is invalid or expired"}"#);
        assert_eq!(
            err.error_message().as_deref(),
            Some("Token is invalid or expired")
        );

        assert_eq!(ApiError::http(500, "<html>").error_message(), None);
        assert_eq!(ApiError::Timeout.error_message(), None);
    }

    #[test]
    fn test_unexpected_response_has_no_status() {
        let err = ApiError::unexpected_response("login response carries no access token");
        assert_eq!(err.status(), None);
        assert!(!err.is_transport());
        assert_eq!(err.error_message(), None);
        assert_eq!(
            err.to_string(),
            "Unexpected response: login response carries no access token"
        );

        assert_eq!(ApiError::encode("key must be a string").status(), None);
    }

    #[test]
    fn test_display() {
        let err = ApiError::http(404, "not found");
        assert_eq!(err.to_string(), "HTTP error 404: not found");
    }
}
