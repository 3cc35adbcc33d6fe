// Notification gateway that delivers alerts to the log
use crate::application::ports::NotificationGateway;
use crate::domain::alert::Notification;
use crate::error::GatewayError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Headless stand-in for the OS notification centre.
///
/// Authorization is decided up front by configuration. Delivered keys are
/// tracked like pending requests so a repeated key replaces rather than
/// duplicates, and the badge mirrors what a device would show.
#[derive(Debug)]
pub struct TracingNotifier {
    grant: bool,
    state: Mutex<NotifierState>,
}

#[derive(Debug, Default)]
struct NotifierState {
    authorized: bool,
    delivered: HashSet<String>,
    badge: u32,
}

impl TracingNotifier {
    pub fn new(grant: bool) -> Self {
        Self {
            grant,
            state: Mutex::new(NotifierState::default()),
        }
    }

    pub fn badge(&self) -> u32 {
        self.state.lock().badge
    }

    pub fn delivered_count(&self) -> usize {
        self.state.lock().delivered.len()
    }
}

#[async_trait]
impl NotificationGateway for TracingNotifier {
    async fn request_authorization(&self) -> bool {
        self.state.lock().authorized = self.grant;
        tracing::info!("Notification authorization granted: {}", self.grant);
        self.grant
    }

    async fn authorization_status(&self) -> bool {
        self.state.lock().authorized
    }

    async fn schedule_immediate(&self, notification: Notification) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if !state.authorized {
            return Err(GatewayError::NotAuthorized);
        }

        state.delivered.insert(notification.dedupe_key.clone());
        state.badge = notification.badge;
        tracing::info!(
            key = %notification.dedupe_key,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }

    async fn clear_all(&self) {
        let mut state = self.state.lock();
        state.delivered.clear();
        state.badge = 0;
    }

    async fn clear_badge(&self) {
        self.state.lock().badge = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(key: &str) -> Notification {
        Notification {
            dedupe_key: key.to_string(),
            title: "High Fatigue Alert".to_string(),
            body: "Your current fatigue level (8.0) has exceeded your threshold (7.0).".to_string(),
            badge: 1,
        }
    }

    #[tokio::test]
    async fn test_refuses_delivery_before_authorization() {
        let notifier = TracingNotifier::new(true);

        assert!(!notifier.authorization_status().await);
        assert!(matches!(
            notifier.schedule_immediate(notification("a")).await,
            Err(GatewayError::NotAuthorized)
        ));
    }

    #[tokio::test]
    async fn test_denied_authorization_stays_denied() {
        let notifier = TracingNotifier::new(false);

        assert!(!notifier.request_authorization().await);
        assert!(notifier.schedule_immediate(notification("a")).await.is_err());
    }

    #[tokio::test]
    async fn test_distinct_keys_are_all_delivered() {
        let notifier = TracingNotifier::new(true);
        notifier.request_authorization().await;

        notifier.schedule_immediate(notification("fatigue-threshold-1")).await.unwrap();
        notifier.schedule_immediate(notification("fatigue-threshold-2")).await.unwrap();
        notifier.schedule_immediate(notification("fatigue-threshold-2")).await.unwrap();

        assert_eq!(notifier.delivered_count(), 2);
        assert_eq!(notifier.badge(), 1);

        notifier.clear_badge().await;
        assert_eq!(notifier.badge(), 0);
        notifier.clear_all().await;
        assert_eq!(notifier.delivered_count(), 0);
    }
}
