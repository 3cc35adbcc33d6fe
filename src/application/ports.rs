// Ports the application layer depends on; adapters live in infrastructure
use crate::domain::alert::Notification;
use crate::domain::forecast::ForecastSet;
use crate::error::{FetchError, GatewayError, PersistenceError, SettingsError};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Fetch and normalize the latest forecast. Never retries.
    async fn fetch_predictions(&self) -> Result<ForecastSet, FetchError>;
}

/// Durable string storage addressed by key
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Must be durable when it returns.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Typed user preference storage
pub trait SettingsProvider: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_f64(&self, key: &str) -> Option<f64>;
    fn get_i64(&self, key: &str) -> Option<i64>;

    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError>;
    fn set_f64(&self, key: &str, value: f64) -> Result<(), SettingsError>;
    fn set_i64(&self, key: &str, value: i64) -> Result<(), SettingsError>;
}

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn request_authorization(&self) -> bool;

    async fn authorization_status(&self) -> bool;

    /// Deliver right away. Distinct dedupe keys are never coalesced.
    async fn schedule_immediate(&self, notification: Notification) -> Result<(), GatewayError>;

    async fn clear_all(&self);

    async fn clear_badge(&self);
}

/// Work run on every tick of a periodic task
pub type Tick = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs a tick immediately and then once per period until cancelled.
///
/// Cancelling stops future ticks only; work a tick already started runs to
/// completion.
pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, period: Duration, tick: Tick) -> Box<dyn ScheduledTask>;
}

pub trait ScheduledTask: Send + Sync {
    /// Idempotent.
    fn cancel(&self);
}
