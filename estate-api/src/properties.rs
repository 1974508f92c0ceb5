//! Listing, seller and favorite endpoints.

use crate::client::EstateApi;
use crate::filter::PropertyFilter;
use crate::models::{Amenity, FavoriteStatus, Page, Property, PropertyStatus};
use crate::upload::PropertyUpload;
use estate_core::{RequestContext, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Deserialize)]
struct FavoriteResponse {
    status: FavoriteStatus,
}

impl EstateApi {
    /// Search listings.
    pub async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let page: Page<Property> = self.session.send_json(filter.to_request()).await?;
        Ok(page.into_items())
    }

    /// Fetch one listing.
    pub async fn get_property(&self, id: u64) -> Result<Property> {
        self.session.get(&format!("/properties/{}/", id)).await
    }

    /// Listings owned by the current user.
    pub async fn my_properties(&self) -> Result<Vec<Property>> {
        let page: Page<Property> = self
            .session
            .send_json(RequestContext::get("/properties/my_properties/").cache_bust())
            .await?;
        Ok(page.into_items())
    }

    /// Create a listing from a multipart upload.
    pub async fn create_property(&self, upload: &PropertyUpload) -> Result<Property> {
        let form = upload.to_form();
        debug!(fields = form.len(), images = upload.images.len(), "Creating listing");
        self.session
            .send_json(RequestContext::post("/properties/").multipart(form))
            .await
    }

    /// Apply changes to a listing.
    ///
    /// An upload with nothing to send is not sent, and `None` is returned.
    pub async fn update_property(
        &self,
        id: u64,
        upload: &PropertyUpload,
    ) -> Result<Option<Property>> {
        let form = upload.to_form();
        if form.is_empty() {
            debug!(id, "No listing changes to send");
            return Ok(None);
        }
        let property = self
            .session
            .send_json(RequestContext::patch(format!("/properties/{}/", id)).multipart(form))
            .await?;
        Ok(Some(property))
    }

    /// Set the status of a listing, e.g. mark it sold.
    pub async fn update_property_status(&self, id: u64, status: PropertyStatus) -> Result<Property> {
        self.session
            .send_json(
                RequestContext::patch(format!("/properties/{}/", id))
                    .json(&json!({ "status": status.as_str() })),
            )
            .await
    }

    /// Delete a listing.
    pub async fn delete_property(&self, id: u64) -> Result<()> {
        self.session
            .send_empty(RequestContext::delete(format!("/properties/{}/", id)))
            .await
    }

    /// Save or unsave a listing.
    pub async fn toggle_favorite(&self, id: u64) -> Result<FavoriteStatus> {
        let response: FavoriteResponse = self
            .session
            .send_json(RequestContext::post(format!(
                "/properties/{}/toggle_favorite/",
                id
            )))
            .await?;
        Ok(response.status)
    }

    /// Listings the current user saved.
    pub async fn favorites(&self) -> Result<Vec<Property>> {
        let page: Page<Property> = self
            .session
            .send_json(RequestContext::get("/properties/favorites/").cache_bust())
            .await?;
        Ok(page.into_items())
    }

    /// Amenities a listing can be tagged with.
    pub async fn amenities(&self) -> Result<Vec<Amenity>> {
        let page: Page<Amenity> = self.session.get("/amenities/").await?;
        Ok(page.into_items())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{api_for, mock_store};
    use crate::*;
    use estate_core::FilePart;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Listing {}", id),
            "price": "4500000.00",
            "listing_type": "SALE",
            "status": "VERIFIED",
            "images": ["/media/properties/a.jpg"]
        })
    }

    #[tokio::test]
    async fn test_list_properties_sends_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/properties/"))
            .and(query_param("listing_type", "RENT"))
            .and(query_param("city", "Sangrur"))
            .and(query_param("ordering", "-id"))
            .and(query_param("price__lte", "5000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "next": null,
                "results": [listing(1), listing(2)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, None);
        let filter = PropertyFilter::new()
            .listing_type(ListingType::Rent)
            .city("Sangrur")
            .price(PriceRange::Under50Lakh);
        let listings = api.list_properties(&filter).await.unwrap();

        let ids: Vec<u64> = listings.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(listings[0].price, Some(4_500_000.0));
    }

    #[tokio::test]
    async fn test_my_properties_accepts_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/properties/my_properties/"))
            .and(header("authorization", "Bearer a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing(5)])))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(mock_store()));
        let mine = api.my_properties().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, Some(PropertyStatus::Verified));

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().unwrap_or_default().contains("_t="));
    }

    #[tokio::test]
    async fn test_get_property_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/properties/99/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, None);
        let err = api.get_property(99).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.error_message().as_deref(), Some("Not found."));
    }

    #[tokio::test]
    async fn test_create_property_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/properties/"))
            .and(body_string_contains("name=\"title\""))
            .and(body_string_contains("name=\"uploaded_images\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(listing(10)))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(mock_store()));
        let upload = PropertyUpload::new()
            .title("Listing 10")
            .price(4_500_000.0)
            .listing_type(ListingType::Sale)
            .image(FilePart::new("photo_0.jpg", b"fake-jpeg".to_vec()));
        let created = api.create_property(&upload).await.unwrap();
        assert_eq!(created.id, 10);
    }

    #[tokio::test]
    async fn test_update_property_skips_empty_changes() {
        let server = MockServer::start().await;
        let (api, _) = api_for(&server, Some(mock_store()));

        let updated = api.update_property(4, &PropertyUpload::new()).await.unwrap();
        assert_eq!(updated, None);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_property_sends_deletions() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/properties/4/"))
            .and(body_string_contains("name=\"delete_images\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(4)))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(mock_store()));
        let upload = PropertyUpload::new().delete_image(11).delete_image(12);
        let updated = api.update_property(4, &upload).await.unwrap();
        assert_eq!(updated.map(|p| p.id), Some(4));
    }

    #[tokio::test]
    async fn test_mark_sold() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/properties/4/"))
            .and(body_json(json!({"status": "SOLD"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 4,
                "status": "SOLD"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(mock_store()));
        let next = PropertyStatus::Verified.toggled();
        let updated = api.update_property_status(4, next).await.unwrap();
        assert_eq!(updated.status, Some(PropertyStatus::Sold));
    }

    #[tokio::test]
    async fn test_delete_property() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/properties/4/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(mock_store()));
        api.delete_property(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_favorite_and_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/properties/7/toggle_favorite/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "favorited"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/properties/favorites/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing(7)])))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(mock_store()));
        let status = api.toggle_favorite(7).await.unwrap();
        assert!(status.is_favorite());

        let saved = api.favorites().await.unwrap();
        assert_eq!(saved[0].id, 7);
    }

    #[tokio::test]
    async fn test_amenities() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/amenities/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Road"},
                {"id": 3, "name": "Water"}
            ])))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, None);
        let amenities = api.amenities().await.unwrap();
        let names: Vec<_> = amenities.iter().filter_map(|a| a.name.as_deref()).collect();
        assert_eq!(names, vec!["Road", "Water"]);
    }
}
