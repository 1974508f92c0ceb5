//! # estate-core
//!
//! Core types, configuration, and error handling for the estate marketplace
//! client.
//!
//! This crate provides the foundational types shared by the rest of the
//! workspace:
//!
//! - **Errors**: [`ApiError`] for everything a backend call can fail with
//! - **Config**: [`ClientConfig`] with the API root and transport knobs
//! - **Tokens**: [`TokenPair`] and the storage keys tokens live under
//! - **Context**: [`RequestContext`], the per-call descriptor with its
//!   explicit `retried` flag
//! - **Events**: [`SessionEvent`] published when a session ends
//!
//! ## Example
//!
//! ```rust
//! use estate_core::{ClientConfig, RequestContext};
//!
//! let config = ClientConfig::for_base_url("http://localhost:8000/api").unwrap();
//! let ctx = RequestContext::get("/properties/")
//!     .query("listing_type", "SALE")
//!     .query("ordering", "-id");
//!
//! assert_eq!(config.endpoint(&ctx.path), "http://localhost:8000/api/properties/");
//! assert!(!ctx.retried);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod tokens;

pub use config::ClientConfig;
pub use context::{FilePart, FormValue, Method, MultipartForm, RequestBody, RequestContext};
pub use errors::{ApiError, Result};
pub use events::{SessionEvent, SessionEvents, SessionNotice};
pub use tokens::{bearer, TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_KEYS};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ApiError, ClientConfig, Method, RequestContext, Result, SessionEvent, SessionEvents,
        TokenPair,
    };
}
