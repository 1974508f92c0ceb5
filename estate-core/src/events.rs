//! Session lifecycle events.
//!
//! The session client never navigates. When a session ends it publishes a
//! [`SessionEvent`] on a broadcast channel, and whatever owns the UI flow
//! subscribes and decides what to show.

use tokio::sync::broadcast;

/// Title of the session-expired notice.
pub const SESSION_EXPIRED_TITLE: &str = "Session Expired";

/// Body of the session-expired notice.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// A user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNotice {
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
}

impl SessionNotice {
    /// Create a notice.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// The standard "session expired, please log in again" notice.
    pub fn session_expired() -> Self {
        Self::new(SESSION_EXPIRED_TITLE, SESSION_EXPIRED_MESSAGE)
    }
}

/// Something that happened to the stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were rejected and could not be refreshed. Tokens are gone.
    Expired {
        /// Notice to show the user.
        notice: SessionNotice,
    },
    /// The user logged out. Tokens are gone.
    LoggedOut,
    /// A new access token was minted from the refresh token.
    Refreshed,
}

impl SessionEvent {
    /// The standard expiry event.
    pub fn expired() -> Self {
        Self::Expired {
            notice: SessionNotice::session_expired(),
        }
    }

    /// Whether the user must authenticate again.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Expired { .. } | Self::LoggedOut)
    }
}

/// Publisher half of the session event channel.
///
/// Cloning shares the same channel. Publishing with no subscribers is fine.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a channel holding up to `capacity` undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers that will see it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(16)
    }
}
