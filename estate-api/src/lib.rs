//! # estate-api
//!
//! Typed endpoint wrappers for the estate marketplace backend.
//!
//! All calls go through [`estate_session::SessionClient`], so they share
//! bearer attach and refresh-on-401.
//!
//! ## Endpoints
//!
//! | Area | Methods |
//! |------|---------|
//! | Auth | [`EstateApi::send_otp`], [`EstateApi::verify_otp`], [`EstateApi::register`], [`EstateApi::logout`] |
//! | Profile | [`EstateApi::get_profile`], [`EstateApi::update_profile`], [`EstateApi::delete_account`] |
//! | Listings | [`EstateApi::list_properties`], [`EstateApi::get_property`], [`EstateApi::my_properties`] |
//! | Seller | [`EstateApi::create_property`], [`EstateApi::update_property`], [`EstateApi::update_property_status`], [`EstateApi::delete_property`] |
//! | Favorites | [`EstateApi::toggle_favorite`], [`EstateApi::favorites`] |
//! | Inquiries | [`EstateApi::inquire`], [`EstateApi::inquiries`], [`EstateApi::inquiries_with_properties`] |
//! | Amenities | [`EstateApi::amenities`] |
//!
//! ## Example
//!
//! ```ignore
//! use estate_api::{EstateApi, PropertyFilter, PriceRange};
//! use estate_core::ClientConfig;
//! use estate_session::InMemoryTokenStore;
//! use std::sync::Arc;
//!
//! let api = EstateApi::connect(ClientConfig::from_env()?, Arc::new(InMemoryTokenStore::new()))?;
//! let filter = PropertyFilter::new().city("Sangrur").price(PriceRange::Under50Lakh);
//! for listing in api.list_properties(&filter).await? {
//!     println!("{:?} {:?}", listing.title, listing.price);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod filter;
pub mod inquiries;
pub mod models;
pub mod properties;
pub mod upload;

pub use auth::{OtpOutcome, OtpSession};
pub use client::EstateApi;
pub use filter::{PriceRange, PropertyFilter, CRORE, LAKH};
pub use models::{
    Amenity, FavoriteStatus, Inquiry, ListingType, Page, Profile, ProfileUpdate, Property,
    PropertyImage, PropertyStatus,
};
pub use upload::{AreaUnit, PropertyUpload};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        EstateApi, ListingType, OtpOutcome, PriceRange, Property, PropertyFilter,
        PropertyStatus, PropertyUpload,
    };
}
