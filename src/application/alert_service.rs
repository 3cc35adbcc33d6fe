// Alert service - Turns alert decisions into local notifications
use crate::application::ports::NotificationGateway;
use crate::domain::alert::AlertDecision;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub suppressed: usize,
    pub failed: usize,
}

/// Holds the authorization state and forwards notifications to the gateway.
/// Without authorization every dispatch is a no-op.
pub struct AlertService {
    gateway: Arc<dyn NotificationGateway>,
    authorized: AtomicBool,
}

impl AlertService {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self {
            gateway,
            authorized: AtomicBool::new(false),
        }
    }

    pub async fn request_permission(&self) -> bool {
        let granted = self.gateway.request_authorization().await;
        self.authorized.store(granted, Ordering::SeqCst);
        if !granted {
            tracing::warn!("Notification permission not granted; alerts are disabled");
        }
        granted
    }

    pub async fn refresh_authorization(&self) -> bool {
        let granted = self.gateway.authorization_status().await;
        self.authorized.store(granted, Ordering::SeqCst);
        granted
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    pub async fn dispatch(&self, decisions: &[AlertDecision], at: DateTime<Utc>) -> DispatchReport {
        let mut report = DispatchReport::default();

        if !self.is_authorized() {
            report.suppressed = decisions.len();
            if !decisions.is_empty() {
                tracing::debug!("Suppressing {} alert(s): not authorized", decisions.len());
            }
            return report;
        }

        for decision in decisions {
            let notification = decision.to_notification(at);
            let key = notification.dedupe_key.clone();
            match self.gateway.schedule_immediate(notification).await {
                Ok(()) => {
                    tracing::info!("Scheduled notification {}", key);
                    report.delivered += 1;
                }
                Err(e) => {
                    tracing::warn!("Error scheduling notification {}: {}", key, e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    pub async fn clear_all(&self) {
        self.gateway.clear_all().await;
    }

    pub async fn clear_badge(&self) {
        self.gateway.clear_badge().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::RecordingGateway;
    use chrono::TimeZone;

    fn threshold_alert() -> AlertDecision {
        AlertDecision::ThresholdAlert {
            current_value: 8.0,
            threshold: 7.0,
        }
    }

    #[tokio::test]
    async fn test_dispatch_is_noop_without_authorization() {
        let gateway = Arc::new(RecordingGateway::new(false));
        let service = AlertService::new(gateway.clone());

        assert!(!service.request_permission().await);
        let at = Utc.with_ymd_and_hms(2025, 8, 8, 12, 0, 0).unwrap();
        let report = service.dispatch(&[threshold_alert()], at).await;

        assert_eq!(report.suppressed, 1);
        assert!(gateway.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_delivers_each_decision() {
        let gateway = Arc::new(RecordingGateway::new(true));
        let service = AlertService::new(gateway.clone());
        service.request_permission().await;

        let decisions = [
            threshold_alert(),
            AlertDecision::EarlyWarningAlert {
                predicted_value: 9.0,
                threshold: 7.0,
                lead_minutes: 30,
            },
        ];
        let at = Utc.with_ymd_and_hms(2025, 8, 8, 12, 0, 0).unwrap();
        let report = service.dispatch(&decisions, at).await;

        assert_eq!(report.delivered, 2);
        let titles: Vec<String> = gateway.delivered().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["High Fatigue Alert", "Fatigue Warning"]);
    }

    #[tokio::test]
    async fn test_gateway_failures_are_counted_not_raised() {
        let gateway = Arc::new(RecordingGateway::new(true));
        gateway.fail_deliveries(true);
        let service = AlertService::new(gateway.clone());
        service.refresh_authorization().await;

        let at = Utc.with_ymd_and_hms(2025, 8, 8, 12, 0, 0).unwrap();
        let report = service.dispatch(&[threshold_alert()], at).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 0);
    }

    #[tokio::test]
    async fn test_clear_badge_reaches_gateway() {
        let gateway = Arc::new(RecordingGateway::new(true));
        let service = AlertService::new(gateway.clone());

        service.clear_badge().await;
        service.clear_all().await;

        assert_eq!(gateway.clear_calls(), (1, 1));
    }
}
