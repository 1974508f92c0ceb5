//! HTTP transport with bearer attach and refresh-on-401.

use crate::error::transport_error;
use crate::refresh::Refresher;
use crate::store::{InMemoryTokenStore, TokenStore};
use estate_core::{
    bearer, ApiError, ClientConfig, FormValue, Method, MultipartForm, RequestBody,
    RequestContext, Result, SessionEvent, SessionEvents,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// HTTP client that authenticates every request from the token store.
///
/// Each request re-reads the access token from storage. A 401 on a request
/// that has not been retried triggers exactly one refresh-and-retry; if the
/// refresh cannot happen, both tokens are deleted and
/// [`SessionEvent::Expired`] is published.
#[derive(Clone)]
pub struct SessionClient {
    client: Client,
    config: ClientConfig,
    store: Arc<dyn TokenStore>,
    refresher: Refresher,
    events: SessionEvents,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("refresh_url", &self.refresher.url())
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Create a client for `config` reading tokens from `store`.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        SessionClientBuilder::new(config).store(store).build()
    }

    /// Start building a client.
    pub fn builder(config: ClientConfig) -> SessionClientBuilder {
        SessionClientBuilder::new(config)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the token store.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Get the session event publisher.
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send a request, recovering once from an expired access token.
    pub async fn send(&self, ctx: RequestContext) -> Result<Response> {
        match self.dispatch(&ctx).await {
            Ok(response) => Ok(response),
            Err(err) if should_recover(&ctx, &err) => self.recover(ctx, err).await,
            Err(err) => Err(err),
        }
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<_>` targets
    /// accept `204 No Content`.
    pub async fn send_json<T: DeserializeOwned>(&self, ctx: RequestContext) -> Result<T> {
        let response = self.send(ctx).await?;
        let text = response.text().await.map_err(transport_error)?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }

    /// Send a request and discard the response body.
    pub async fn send_empty(&self, ctx: RequestContext) -> Result<()> {
        self.send(ctx).await.map(|_| ())
    }

    /// `GET` a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(RequestContext::get(path)).await
    }

    /// Delete both tokens and publish [`SessionEvent::Expired`].
    pub async fn expire_session(&self) {
        self.clear_tokens().await;
        warn!("Session expired; stored credentials cleared");
        self.events.publish(SessionEvent::expired());
    }

    /// Delete both tokens and publish [`SessionEvent::LoggedOut`].
    pub async fn end_session(&self) {
        self.clear_tokens().await;
        info!("Session ended; stored credentials cleared");
        self.events.publish(SessionEvent::LoggedOut);
    }

    async fn clear_tokens(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear stored tokens");
        }
    }

    /// Pre-send hook: resolve the bearer token for `ctx`.
    ///
    /// Store failures are logged and the request goes out unauthenticated.
    async fn bearer_for(&self, ctx: &RequestContext) -> Option<String> {
        if let Some(ref token) = ctx.bearer {
            return Some(token.clone());
        }
        match self.store.access_token().await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read access token; sending unauthenticated");
                None
            }
        }
    }

    /// Build the transport request for `ctx`.
    fn build_request(&self, ctx: &RequestContext, token: Option<&str>) -> Result<RequestBuilder> {
        let url = self.config.endpoint(&ctx.path);
        let mut request = self
            .client
            .request(to_reqwest_method(ctx.method), &url)
            .header("Accept", "application/json");

        if !ctx.query.is_empty() {
            request = request.query(&ctx.query);
        }
        if let Some(token) = token {
            request = request.header("Authorization", bearer(token));
        }
        match &ctx.body {
            Some(RequestBody::Json(value)) => request = request.json(value),
            Some(RequestBody::Multipart(form)) => request = request.multipart(to_form(form)?),
            Some(RequestBody::Invalid(msg)) => {
                return Err(ApiError::encode(format!("request body for {}: {msg}", ctx.path)));
            }
            None => {}
        }
        Ok(request)
    }

    /// Attach credentials, send once, and map non-2xx to [`ApiError::Http`].
    async fn dispatch(&self, ctx: &RequestContext) -> Result<Response> {
        let token = self.bearer_for(ctx).await;

        debug!(
            method = %ctx.method,
            path = %ctx.path,
            authenticated = token.is_some(),
            retried = ctx.retried,
            "Making HTTP request"
        );

        let response = self
            .build_request(ctx, token.as_deref())?
            .send()
            .await
            .map_err(transport_error)?;

        check_response(response).await
    }

    /// Post-receive hook for a 401 on a request that has not been retried.
    async fn recover(&self, mut ctx: RequestContext, original: ApiError) -> Result<Response> {
        ctx.mark_retried();

        let refresh_token = match self.store.refresh_token().await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!(path = %ctx.path, "No refresh token stored");
                self.expire_session().await;
                return Err(original);
            }
            Err(e) => {
                warn!(error = %e, "Failed to read refresh token");
                self.expire_session().await;
                return Err(original);
            }
        };

        let pair = match self.refresher.refresh(&refresh_token).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(path = %ctx.path, error = %e, "Token refresh failed");
                self.expire_session().await;
                return Err(original);
            }
        };

        if let Err(e) = self.store.save_pair(&pair).await {
            warn!(error = %e, "Failed to persist refreshed tokens");
        }
        info!(path = %ctx.path, rotated = pair.refresh.is_some(), "Access token refreshed");
        self.events.publish(SessionEvent::Refreshed);

        ctx.bearer = Some(pair.access);
        self.dispatch(&ctx).await
    }
}

/// Whether `err` on `ctx` should enter the refresh-and-retry cycle.
///
/// Requests carrying their own bearer (registration) never do: that token is
/// not owned by the session.
fn should_recover(ctx: &RequestContext, err: &ApiError) -> bool {
    err.is_unauthorized() && !ctx.retried && ctx.bearer.is_none()
}

/// Check an HTTP response and convert to [`ApiError::Http`] if needed.
async fn check_response(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::http(status, body))
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn to_form(form: &MultipartForm) -> Result<Form> {
    let mut out = Form::new();
    for (name, value) in &form.fields {
        out = match value {
            FormValue::Text(text) => out.text(name.clone(), text.clone()),
            FormValue::File(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.file_name.clone())
                    .mime_str(file.mime.as_ref())
                    .map_err(|e| {
                        ApiError::configuration(format!("invalid content type for {name}: {e}"))
                    })?;
                out.part(name.clone(), part)
            }
        };
    }
    Ok(out)
}

/// Builder for a [`SessionClient`].
pub struct SessionClientBuilder {
    config: ClientConfig,
    client: Option<Client>,
    store: Option<Arc<dyn TokenStore>>,
    events: Option<SessionEvents>,
    refresher: Option<Refresher>,
}

impl SessionClientBuilder {
    /// Create a new builder.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: None,
            store: None,
            events: None,
            refresher: None,
        }
    }

    /// Set the underlying HTTP client.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the token store. Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Publish on an existing event channel.
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Use a custom refresher instead of the configured refresh endpoint.
    pub fn refresher(mut self, refresher: Refresher) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Build the session client.
    pub fn build(self) -> Result<SessionClient> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder().user_agent(self.config.user_agent.clone());
                if let Some(timeout) = self.config.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| ApiError::configuration(format!("failed to build HTTP client: {e}")))?
            }
        };

        // The refresher shares the connection pool but none of the hooks.
        let refresher = self
            .refresher
            .unwrap_or_else(|| Refresher::new(client.clone(), self.config.refresh_url()));
        let events = self
            .events
            .unwrap_or_else(|| SessionEvents::new(self.config.event_capacity));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));

        Ok(SessionClient {
            client,
            config: self.config,
            store,
            refresher,
            events,
        })
    }
}
