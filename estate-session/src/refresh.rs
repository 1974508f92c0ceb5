//! Token refresh call.
//!
//! The refresh request goes out on the bare transport: no stored bearer is
//! attached and a failure here is never itself recovered. That keeps the
//! refresh from recursing into the recovery path that invoked it.

use crate::error::RefreshError;
use estate_core::TokenPair;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

/// Exchanges refresh tokens for new access tokens.
#[derive(Debug, Clone)]
pub struct Refresher {
    client: Client,
    url: String,
}

impl Refresher {
    /// Create a refresher posting to `url` with `client`.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Endpoint this refresher posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Refresh an expired access token.
    ///
    /// Does not store anything; the caller persists the returned pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        debug!(url = %self.url, "Refreshing access token");

        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected { status, body });
        }

        let body = response.text().await?;
        let parsed: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        match parsed.access {
            Some(access) if !access.is_empty() => Ok(TokenPair {
                access,
                refresh: parsed.refresh.filter(|r| !r.is_empty()),
            }),
            _ => Err(RefreshError::Malformed(
                "response has no access token".to_string(),
            )),
        }
    }
}
