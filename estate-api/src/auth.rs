//! Phone OTP authentication and profile endpoints.

use crate::client::EstateApi;
use crate::models::{Profile, ProfileUpdate};
use estate_core::{ApiError, RequestContext, Result, SessionEvent, TokenPair};
use estate_session::TokenStore;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

/// Handle for an OTP sent to a phone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpSession {
    /// Id to quote when verifying the code.
    pub session_id: String,
}

/// What a verified OTP means for the phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpOutcome {
    /// Existing account. Tokens have been stored.
    Login {
        /// The stored tokens.
        tokens: TokenPair,
        /// Whether name/email/city/address are filled in.
        is_profile_complete: bool,
    },
    /// Unknown number. Call [`EstateApi::register`] with this token.
    Register {
        /// One-time bearer for the registration call.
        registration_token: String,
    },
}

#[derive(Deserialize)]
struct VerifyOtpResponse {
    status: String,
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    is_profile_complete: bool,
    #[serde(default)]
    registration_token: Option<String>,
}

/// Drain `events`, reporting whether an expiry went by.
fn saw_expiry(events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Expired { .. }) => return true,
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return false,
        }
    }
}

impl EstateApi {
    /// Send a one-time code to `phone`.
    pub async fn send_otp(&self, phone: &str) -> Result<OtpSession> {
        self.session
            .send_json(RequestContext::post("/auth/send-otp/").json(&json!({ "phone": phone })))
            .await
    }

    /// Verify the code for `session_id`.
    ///
    /// For a known number the returned tokens are persisted before this
    /// returns.
    pub async fn verify_otp(&self, session_id: &str, otp_code: &str) -> Result<OtpOutcome> {
        let response: VerifyOtpResponse = self
            .session
            .send_json(
                RequestContext::post("/auth/verify-otp/")
                    .json(&json!({ "session_id": session_id, "otp_code": otp_code })),
            )
            .await?;

        if response.status == "LOGIN" {
            let access = response.access.ok_or_else(|| {
                ApiError::unexpected_response("login response carries no access token")
            })?;
            let pair = TokenPair {
                access,
                refresh: response.refresh,
            };
            self.session.store().save_pair(&pair).await?;
            debug!(is_profile_complete = response.is_profile_complete, "Logged in with OTP");
            return Ok(OtpOutcome::Login {
                tokens: pair,
                is_profile_complete: response.is_profile_complete,
            });
        }

        match response.registration_token {
            Some(registration_token) => Ok(OtpOutcome::Register { registration_token }),
            None => Err(ApiError::unexpected_response(format!(
                "verify-otp status {:?} without a registration token",
                response.status
            ))),
        }
    }

    /// Create the account for a verified new number and store its tokens.
    pub async fn register(
        &self,
        registration_token: &str,
        profile: &ProfileUpdate,
    ) -> Result<TokenPair> {
        let pair: TokenPair = self
            .session
            .send_json(
                RequestContext::post("/auth/register/")
                    .bearer(registration_token)
                    .json(profile),
            )
            .await?;
        self.session.store().save_pair(&pair).await?;
        Ok(pair)
    }

    /// Whether an access token is stored.
    pub async fn is_logged_in(&self) -> bool {
        matches!(self.session.store().access_token().await, Ok(Some(t)) if !t.is_empty())
    }

    /// Log out: revoke the refresh token server-side, then forget both tokens.
    ///
    /// Local tokens are cleared and [`SessionEvent::LoggedOut`] is published
    /// even when the revoke call fails; its error is still returned. If the
    /// call itself expired the session (401 and no usable refresh token),
    /// tokens are already gone and only [`SessionEvent::Expired`] is seen.
    pub async fn logout(&self) -> Result<()> {
        let mut events = self.session.subscribe();
        let refresh = match self.session.store().refresh_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read refresh token for logout");
                None
            }
        };

        let result = self
            .session
            .send_empty(RequestContext::post("/auth/logout/").json(&json!({ "refresh": refresh })))
            .await;
        if let Err(ref e) = result {
            warn!(error = %e, "Logout call failed; clearing local session anyway");
        }

        if saw_expiry(&mut events) {
            debug!("Session expired during logout");
        } else {
            self.session.end_session().await;
        }
        result
    }

    /// Fetch the current user's profile.
    pub async fn get_profile(&self) -> Result<Profile> {
        self.session.get("/auth/profile/").await
    }

    /// Change profile fields.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        self.session
            .send_json(RequestContext::patch("/auth/profile/").json(update))
            .await
    }

    /// Delete the account and end the session.
    pub async fn delete_account(&self) -> Result<()> {
        self.session
            .send_empty(RequestContext::delete("/auth/delete-account/"))
            .await?;
        self.session.end_session().await;
        Ok(())
    }
}
