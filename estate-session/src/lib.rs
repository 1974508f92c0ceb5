//! # estate-session
//!
//! Session-aware HTTP client for the estate marketplace backend.
//!
//! Every request is authenticated from persistent storage and recovers from
//! an expired access token with a single refresh-and-retry.
//!
//! ## Core Concepts
//!
//! - **[`SessionClient`]**: sends [`RequestContext`](estate_core::RequestContext)s
//!   with bearer attach and refresh-on-401
//! - **[`TokenStore`]**: where the access and refresh tokens live
//! - **[`Refresher`]**: the bare, hook-free call to the refresh endpoint
//!
//! ## Recovery Protocol
//!
//! 1. A request comes back `401` and has not been retried yet.
//! 2. The request is marked retried and the refresh token is read.
//! 3. The refresh endpoint is called without any hooks.
//! 4. On success the new access token is stored and the request is sent once
//!    more; whatever that returns goes to the caller.
//! 5. Otherwise both tokens are deleted, a
//!    [`SessionEvent::Expired`](estate_core::SessionEvent::Expired) is
//!    published, and the caller gets the original `401`.
//!
//! Transport failures and every other status are returned untouched.
//!
//! ## Example
//!
//! ```ignore
//! use estate_core::{ClientConfig, RequestContext};
//! use estate_session::{FileTokenStore, SessionClient};
//! use std::sync::Arc;
//!
//! let store = Arc::new(FileTokenStore::new("session.json"));
//! let client = SessionClient::new(ClientConfig::from_env()?, store)?;
//!
//! let favorites: serde_json::Value = client
//!     .send_json(RequestContext::get("/properties/favorites/").cache_bust())
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod refresh;
pub mod store;
pub mod transport;

// Re-exports
pub use error::{transport_error, RefreshError, StoreError};
pub use refresh::Refresher;
pub use store::{FileTokenStore, InMemoryTokenStore, TokenStore};
pub use transport::{SessionClient, SessionClientBuilder};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{FileTokenStore, InMemoryTokenStore, SessionClient, TokenStore};
    pub use estate_core::prelude::*;
}
