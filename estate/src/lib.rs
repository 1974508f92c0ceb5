//! # Estate - Session-Aware Marketplace Client
//!
//! Client for the estate marketplace backend: listings, seller uploads,
//! favorites, inquiries and phone-OTP accounts, on top of an HTTP client
//! that keeps the session alive by itself.
//!
//! ## Quick Start
//!
//! ```ignore
//! use estate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EstateClient::from_env("session.json")?;
//!
//!     let filter = PropertyFilter::new()
//!         .listing_type(ListingType::Rent)
//!         .city("Sangrur");
//!     for listing in client.list_properties(&filter).await? {
//!         println!("{:?}", listing.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Sessions
//!
//! Every request carries the stored access token. When the backend answers
//! `401`, the client refreshes once and retries once. When that is not
//! possible the tokens are deleted and a [`SessionEvent::Expired`] is
//! published; a [`SessionController`] turns it into a navigation reset and a
//! notice through the [`Navigator`] and [`Notifier`] you provide.
//!
//! ## Architecture
//!
//! - [`estate_core`] - Errors, configuration, request context, events
//! - [`estate_session`] - Token storage, refresh and the session client
//! - [`estate_api`] - Typed endpoint wrappers

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod controller;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Errors, configuration, request context and session events.
pub use estate_core as core;

/// Token storage, refresh and the session client.
pub use estate_session as session;

/// Typed endpoint wrappers.
pub use estate_api as api;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use client::EstateClient;
pub use controller::{Navigator, Notifier, SessionController};

pub use estate_core::{
    ApiError, ClientConfig, RequestContext, Result, SessionEvent, SessionEvents, SessionNotice,
    TokenPair,
};
pub use estate_session::{FileTokenStore, InMemoryTokenStore, SessionClient, TokenStore};
pub use estate_api::{
    Amenity, AreaUnit, EstateApi, FavoriteStatus, Inquiry, ListingType, OtpOutcome, OtpSession,
    PriceRange, Profile, ProfileUpdate, Property, PropertyFilter, PropertyImage, PropertyStatus,
    PropertyUpload,
};

/// Prelude for common imports.
///
/// ```rust
/// use estate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ApiError, ClientConfig, EstateClient, ListingType, Navigator, Notifier, OtpOutcome,
        PriceRange, Property, PropertyFilter, PropertyStatus, PropertyUpload, Result,
        SessionController, SessionEvent, SessionNotice, TokenStore,
    };
}
