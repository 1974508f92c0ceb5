//! Session error types.

use estate_core::ApiError;
use thiserror::Error;

/// Errors from a [`TokenStore`](crate::store::TokenStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds something other than a string map.
    #[error("Token store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Other backend failure.
    #[error("Token store error: {0}")]
    Backend(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::storage(err.to_string())
    }
}

/// Errors from the token refresh call.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The refresh endpoint answered with a non-success status.
    #[error("Refresh rejected with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A success response without an access token.
    #[error("Refresh response is malformed: {0}")]
    Malformed(String),

    /// No response was received.
    #[error("Refresh transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Map a reqwest failure to the client error taxonomy.
///
/// Only call this for errors raised while sending or reading a body; status
/// codes are handled separately.
pub fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::transport(format!("failed to read response body: {err}"))
    } else {
        ApiError::transport(err.to_string())
    }
}
