//! Buyer inquiries.

use crate::client::EstateApi;
use crate::models::{Inquiry, Page};
use estate_core::{RequestContext, Result};
use futures::future::join_all;
use serde_json::json;
use tracing::warn;

impl EstateApi {
    /// Register interest in a listing.
    pub async fn inquire(&self, property_id: u64) -> Result<Inquiry> {
        self.session
            .send_json(RequestContext::post("/inquiries/").json(&json!({ "property": property_id })))
            .await
    }

    /// Inquiries made by the current user.
    pub async fn inquiries(&self) -> Result<Vec<Inquiry>> {
        let page: Page<Inquiry> = self.session.get("/inquiries/").await?;
        Ok(page.into_items())
    }

    /// Inquiries with their listings attached.
    ///
    /// Listings are fetched concurrently. A listing that fails to load is
    /// logged and leaves `listing` empty; only the inquiry list
    /// itself failing is an error.
    pub async fn inquiries_with_properties(&self) -> Result<Vec<Inquiry>> {
        let inquiries = self.inquiries().await?;

        let lookups = inquiries.into_iter().map(|mut inquiry| async move {
            if let Some(property_id) = inquiry.property {
                match self.get_property(property_id).await {
                    Ok(property) => inquiry.listing = Some(property),
                    Err(e) => {
                        warn!(inquiry = inquiry.id, property_id, error = %e, "Failed to load inquired listing");
                    }
                }
            }
            inquiry
        });

        Ok(join_all(lookups).await)
    }
}
