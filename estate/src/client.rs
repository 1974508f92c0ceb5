//! One-stop client construction.

use crate::controller::{Navigator, Notifier, SessionController};
use estate_api::EstateApi;
use estate_core::{ClientConfig, Result};
use estate_session::{FileTokenStore, SessionClient, TokenStore};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Session-aware marketplace client.
///
/// Dereferences to [`EstateApi`], so every endpoint method is available
/// directly.
///
/// ```ignore
/// use estate::prelude::*;
///
/// let client = EstateClient::from_env("session.json")?;
/// let listings = client.list_properties(&PropertyFilter::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct EstateClient {
    api: EstateApi,
}

impl EstateClient {
    /// Create a client for `config` with tokens kept in `store`.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            api: EstateApi::new(SessionClient::new(config, store)?),
        })
    }

    /// Create a client configured from the environment, persisting tokens
    /// to `session_file`.
    pub fn from_env(session_file: impl Into<PathBuf>) -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let store = FileTokenStore::new(session_file);
        info!(
            base_url = %config.base_url,
            session_file = %store.path().display(),
            "Creating estate client"
        );
        Self::new(config, Arc::new(store))
    }

    /// Wrap an already built session client.
    pub fn from_session(session: SessionClient) -> Self {
        Self {
            api: EstateApi::new(session),
        }
    }

    /// The endpoint client.
    pub fn api(&self) -> &EstateApi {
        &self.api
    }

    /// Start a [`SessionController`] for this client's session events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_controller(
        &self,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> SessionController {
        SessionController::spawn(self.api.session().events(), navigator, notifier)
    }
}

impl Deref for EstateClient {
    type Target = EstateApi;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
