//! Backend payloads.
//!
//! Shapes are owned by the backend, so decoding is lenient: the fields the
//! client acts on are typed, unknown fields are kept in `extra`, and the
//! loosely typed ones (decimal prices, image/amenity references) accept
//! every form the backend has been seen to send.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a listing is for sale or rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingType {
    /// `SALE`
    Sale,
    /// `RENT`
    Rent,
}

impl ListingType {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "SALE",
            ListingType::Rent => "RENT",
        }
    }
}

/// Moderation and sale state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyStatus {
    /// Awaiting moderation.
    Pending,
    /// Live.
    Verified,
    /// Marked sold by the owner.
    Sold,
    /// Refused by moderation.
    Rejected,
    /// Anything this client does not know about.
    #[serde(other)]
    Unknown,
}

impl PropertyStatus {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Pending => "PENDING",
            PropertyStatus::Verified => "VERIFIED",
            PropertyStatus::Sold => "SOLD",
            PropertyStatus::Rejected => "REJECTED",
            PropertyStatus::Unknown => "UNKNOWN",
        }
    }

    /// Whether the owner may flip this listing between live and sold.
    pub fn is_owner_toggleable(&self) -> bool {
        matches!(self, PropertyStatus::Verified | PropertyStatus::Sold)
    }

    /// The status an owner toggle moves to: sold listings go back live,
    /// everything else is marked sold.
    pub fn toggled(&self) -> PropertyStatus {
        match self {
            PropertyStatus::Sold => PropertyStatus::Verified,
            _ => PropertyStatus::Sold,
        }
    }
}

/// An image attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ImageRepr")]
pub struct PropertyImage {
    /// Image id, used when deleting images on update.
    pub id: Option<u64>,
    /// Absolute URL or media-relative path.
    pub image: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageRepr {
    Url(String),
    Object {
        #[serde(default)]
        id: Option<u64>,
        image: String,
    },
}

impl From<ImageRepr> for PropertyImage {
    fn from(repr: ImageRepr) -> Self {
        match repr {
            ImageRepr::Url(image) => Self { id: None, image },
            ImageRepr::Object { id, image } => Self { id, image },
        }
    }
}

/// An amenity, either from the catalogue or referenced by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AmenityRepr")]
pub struct Amenity {
    /// Amenity id.
    pub id: u64,
    /// Display name, absent when the listing only references the id.
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmenityRepr {
    Id(u64),
    Object {
        id: u64,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<AmenityRepr> for Amenity {
    fn from(repr: AmenityRepr) -> Self {
        match repr {
            AmenityRepr::Id(id) => Self { id, name: None },
            AmenityRepr::Object { id, name } => Self { id, name },
        }
    }
}

/// A property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Listing id.
    pub id: u64,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Asking price in rupees.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub price: Option<f64>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Sale or rent.
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    /// Upper-case property type, e.g. `HOUSE` or `PLOT`.
    #[serde(default)]
    pub property_type: Option<String>,
    /// Moderation and sale state.
    #[serde(default)]
    pub status: Option<PropertyStatus>,
    /// Area in `unit`s.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub area: Option<f64>,
    /// Area unit code, e.g. `SQFT`.
    #[serde(default)]
    pub unit: Option<String>,
    /// Bedroom count (houses only).
    #[serde(default)]
    pub bedrooms: Option<u32>,
    /// Bathroom count (houses only).
    #[serde(default)]
    pub bathrooms: Option<u32>,
    /// Whether the current user saved this listing.
    #[serde(default)]
    pub is_favorite: bool,
    /// Attached images, first one is the cover.
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    /// Amenities.
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    /// Cover image, if any.
    pub fn cover_image(&self) -> Option<&PropertyImage> {
        self.images.first()
    }

    /// Ids of the amenities on this listing.
    pub fn amenity_ids(&self) -> Vec<u64> {
        self.amenities.iter().map(|a| a.id).collect()
    }
}

/// An inquiry the current user made on a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    /// Inquiry id.
    pub id: u64,
    /// Id of the listing inquired about.
    #[serde(default)]
    pub property: Option<u64>,
    /// Handling state as reported by the backend.
    #[serde(default)]
    pub status: Option<String>,
    /// Note left by an administrator.
    #[serde(default)]
    pub admin_remarks: Option<String>,
    /// Creation timestamp as sent by the backend.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Short listing label as sent by the backend, usually its title.
    #[serde(default)]
    pub property_details: Option<String>,
    /// The full listing, filled by
    /// [`EstateApi::inquiries_with_properties`](crate::EstateApi::inquiries_with_properties).
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Property>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The current user's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number the account was created with.
    #[serde(default)]
    pub phone: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Address.
    #[serde(default)]
    pub address: Option<String>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile fields sent on registration or update. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// Full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full name.
    #[must_use]
    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    /// Set the email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the city.
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Result of toggling a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteStatus {
    /// Listing is now saved.
    Favorited,
    /// Listing is no longer saved.
    Unfavorited,
}

impl FavoriteStatus {
    /// Whether the listing is saved after the toggle.
    pub fn is_favorite(&self) -> bool {
        matches!(self, FavoriteStatus::Favorited)
    }
}

/// A list endpoint response: either DRF-paginated or a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    /// `{"count": .., "next": .., "results": [..]}`
    Paginated {
        /// Items on this page.
        results: Vec<T>,
        /// Total item count.
        #[serde(default)]
        count: Option<u64>,
        /// URL of the next page.
        #[serde(default)]
        next: Option<String>,
    },
    /// `[..]`
    Bare(Vec<T>),
}

impl<T> Page<T> {
    /// Items of the page.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Paginated { results, .. } => results,
            Page::Bare(items) => items,
        }
    }
}

fn de_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
