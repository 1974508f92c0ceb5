//! Turning session events into navigation.
//!
//! The HTTP layer never navigates. It publishes [`SessionEvent`]s, and a
//! [`SessionController`] running next to the UI reacts to them through the
//! [`Navigator`] and [`Notifier`] the application supplies.

use estate_core::{SessionEvent, SessionEvents, SessionNotice};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Application navigation, as far as the session cares about it.
pub trait Navigator: Send + Sync + 'static {
    /// Drop the back-history and show the unauthenticated entry route.
    fn reset_to_entry(&self);
}

/// User-facing notices.
pub trait Notifier: Send + Sync + 'static {
    /// Show a notice to the user.
    fn notify(&self, notice: &SessionNotice);
}

/// Background task reacting to session events.
///
/// - [`SessionEvent::Expired`]: reset navigation, then show the notice.
/// - [`SessionEvent::LoggedOut`]: reset navigation.
/// - [`SessionEvent::Refreshed`]: nothing.
///
/// The task ends when every publisher has been dropped.
#[derive(Debug)]
pub struct SessionController {
    handle: JoinHandle<()>,
}

impl SessionController {
    /// Subscribe to `events` and start reacting on the current tokio runtime.
    ///
    /// The subscription is taken before this returns, so events published
    /// afterwards are never missed.
    pub fn spawn(
        events: &SessionEvents,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let receiver = events.subscribe();
        let handle = tokio::spawn(run(receiver, navigator, notifier));
        Self { handle }
    }

    /// Whether the task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop reacting to events.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the task to end.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!(error = %e, "Session controller task failed");
            }
        }
    }
}

async fn run(
    mut receiver: Receiver<SessionEvent>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => handle(&event, navigator.as_ref(), notifier.as_ref()),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Session controller fell behind; events dropped");
            }
            Err(RecvError::Closed) => {
                debug!("Session event channel closed");
                break;
            }
        }
    }
}

fn handle(event: &SessionEvent, navigator: &dyn Navigator, notifier: &dyn Notifier) {
    match event {
        SessionEvent::Expired { notice } => {
            navigator.reset_to_entry();
            notifier.notify(notice);
        }
        SessionEvent::LoggedOut => navigator.reset_to_entry(),
        SessionEvent::Refreshed => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    pub(crate) struct RecordingNavigator {
        pub resets: Mutex<usize>,
    }

    impl Navigator for RecordingNavigator {
        fn reset_to_entry(&self) {
            *self.resets.lock() += 1;
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub notices: Mutex<Vec<SessionNotice>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &SessionNotice) {
            self.notices.lock().push(notice.clone());
        }
    }

    fn doubles() -> (Arc<RecordingNavigator>, Arc<RecordingNotifier>) {
        (
            Arc::new(RecordingNavigator::default()),
            Arc::new(RecordingNotifier::default()),
        )
    }

    #[tokio::test]
    async fn test_expired_resets_and_notifies() {
        let events = SessionEvents::new(8);
        let (navigator, notifier) = doubles();
        let controller = SessionController::spawn(&events, navigator.clone(), notifier.clone());

        events.publish(SessionEvent::expired());
        drop(events);
        controller.join().await;

        assert_eq!(*navigator.resets.lock(), 1);
        assert_eq!(*notifier.notices.lock(), vec![SessionNotice::session_expired()]);
    }

    #[tokio::test]
    async fn test_logout_resets_without_notice() {
        let events = SessionEvents::new(8);
        let (navigator, notifier) = doubles();
        let controller = SessionController::spawn(&events, navigator.clone(), notifier.clone());

        events.publish(SessionEvent::LoggedOut);
        events.publish(SessionEvent::Refreshed);
        drop(events);
        controller.join().await;

        assert_eq!(*navigator.resets.lock(), 1);
        assert!(notifier.notices.lock().is_empty());
    }

    #[tokio::test]
    async fn test_lagging_keeps_running() {
        let events = SessionEvents::new(1);
        let (navigator, notifier) = doubles();
        let controller = SessionController::spawn(&events, navigator.clone(), notifier.clone());

        // The task has not been polled yet, so only the last event survives.
        events.publish(SessionEvent::LoggedOut);
        events.publish(SessionEvent::LoggedOut);
        events.publish(SessionEvent::expired());
        drop(events);
        controller.join().await;

        assert_eq!(*navigator.resets.lock(), 1);
        assert_eq!(notifier.notices.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_task() {
        let events = SessionEvents::default();
        let (navigator, notifier) = doubles();
        let controller = SessionController::spawn(&events, navigator, notifier);

        drop(events);
        controller.join().await;
    }
}
