//! The endpoint client.

use estate_core::{ClientConfig, Result, SessionEvent};
use estate_session::{SessionClient, TokenStore};
use std::sync::Arc;

/// Typed access to the marketplace backend.
///
/// Endpoint methods live in [`auth`](crate::auth), [`properties`](crate::properties)
/// and [`inquiries`](crate::inquiries). Every call goes through the wrapped
/// [`SessionClient`], so all of them share the same token handling.
#[derive(Debug, Clone)]
pub struct EstateApi {
    pub(crate) session: SessionClient,
}

impl EstateApi {
    /// Wrap an existing session client.
    pub fn new(session: SessionClient) -> Self {
        Self { session }
    }

    /// Build a session client for `config` and `store` and wrap it.
    pub fn connect(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::new(SessionClient::new(config, store)?))
    }

    /// The underlying session client.
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Resolve a media path from a listing to an absolute URL.
    pub fn media_url(&self, path: &str) -> String {
        self.session.config().media_url(path)
    }
}
