//! Listing search filters.

use crate::models::ListingType;
use estate_core::RequestContext;

/// One lakh rupees.
pub const LAKH: u64 = 100_000;

/// One crore rupees.
pub const CRORE: u64 = 100 * LAKH;

/// Price bracket for listing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceRange {
    /// No price constraint.
    #[default]
    Any,
    /// Below 50 lakh.
    Under50Lakh,
    /// 50 lakh to 1 crore.
    From50LakhTo1Crore,
    /// 1 to 3 crore.
    From1To3Crore,
    /// Explicit bounds, inclusive.
    Between {
        /// Lower bound.
        min: Option<u64>,
        /// Upper bound.
        max: Option<u64>,
    },
}

impl PriceRange {
    /// Inclusive `(min, max)` bounds sent as `price__gte` / `price__lte`.
    pub fn bounds(&self) -> (Option<u64>, Option<u64>) {
        match *self {
            PriceRange::Any => (None, None),
            PriceRange::Under50Lakh => (None, Some(50 * LAKH)),
            PriceRange::From50LakhTo1Crore => (Some(50 * LAKH), Some(CRORE)),
            PriceRange::From1To3Crore => (Some(CRORE), Some(3 * CRORE)),
            PriceRange::Between { min, max } => (min, max),
        }
    }
}

/// Query for `GET /properties/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    /// Sale or rent.
    pub listing_type: ListingType,
    /// City to search in.
    pub city: Option<String>,
    /// Property type; `ALL` or empty means any.
    pub property_type: Option<String>,
    /// Price bracket.
    pub price: PriceRange,
    /// Ordering expression, newest first by default.
    pub ordering: String,
    /// Append the `_t` cache-buster.
    pub cache_bust: bool,
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            listing_type: ListingType::Sale,
            city: None,
            property_type: None,
            price: PriceRange::Any,
            ordering: "-id".to_string(),
            cache_bust: true,
        }
    }
}

impl PropertyFilter {
    /// Create the default filter (for sale, newest first).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sale or rent.
    #[must_use]
    pub fn listing_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = listing_type;
        self
    }

    /// Restrict to a city. Blank values are ignored.
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        let city = city.into();
        self.city = (!city.trim().is_empty()).then(|| city.trim().to_string());
        self
    }

    /// Restrict to a property type. `ALL` clears the restriction.
    #[must_use]
    pub fn property_type(mut self, property_type: impl Into<String>) -> Self {
        let value = property_type.into().trim().to_uppercase();
        self.property_type = (!value.is_empty() && value != "ALL").then_some(value);
        self
    }

    /// Set the price bracket.
    #[must_use]
    pub fn price(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    /// Set the ordering expression.
    #[must_use]
    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = ordering.into();
        self
    }

    /// Enable or disable the cache-buster.
    #[must_use]
    pub fn cache_bust(mut self, enabled: bool) -> Self {
        self.cache_bust = enabled;
        self
    }

    /// Build the request for this filter.
    pub fn to_request(&self) -> RequestContext {
        let (min, max) = self.price.bounds();
        let ctx = RequestContext::get("/properties/")
            .query("listing_type", self.listing_type.as_str())
            .query_opt("city", self.city.as_deref())
            .query_opt("property_type", self.property_type.as_deref())
            .query("ordering", &self.ordering)
            .query_opt("price__gte", min)
            .query_opt("price__lte", max);
        if self.cache_bust {
            ctx.cache_bust()
        } else {
            ctx
        }
    }
}
