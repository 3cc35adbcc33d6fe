// Polling service - Fetch, record and alert on a fixed cadence
use crate::application::alert_service::{AlertService, DispatchReport};
use crate::application::ports::{
    PredictionSource, ScheduledTask, Scheduler, SettingsProvider, Tick,
};
use crate::application::preferences::load_preferences;
use crate::application::series_store::SeriesStore;
use crate::domain::alert::evaluate;
use crate::domain::forecast::{ConnectionState, ForecastSet};
use crate::domain::reading::{FatigueLevel, FatigueReading, TimeRange};
use crate::error::{ErrorClass, FetchError};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(900);

const EVENT_CAPACITY: usize = 32;

/// What to do with a response that completes after a newer one was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResponsePolicy {
    /// Apply every response in completion order, including ones that
    /// complete after `stop()`.
    #[default]
    LastCompletedWins,
    /// Drop responses older than the last applied one, and responses from
    /// cycles issued before the most recent `start()`/`stop()`.
    DiscardStale,
}

#[derive(Debug, Clone, Copy)]
pub struct PollingConfig {
    pub interval: Duration,
    pub stale_policy: StaleResponsePolicy,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            stale_policy: StaleResponsePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Updated {
        appended: bool,
        alerts: DispatchReport,
    },
    Failed(ErrorClass),
    Discarded,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastSnapshot {
    pub connection: ConnectionState,
    pub is_loading: bool,
    pub is_polling: bool,
    pub current: Option<f64>,
    pub level: Option<FatigueLevel>,
    pub forecast: ForecastSet,
    pub chart_values: Vec<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PollEvent {
    Updated {
        snapshot: ForecastSnapshot,
        appended: bool,
    },
    Disconnected {
        error: String,
    },
}

struct PollState {
    forecast: ForecastSet,
    connection: ConnectionState,
    is_loading: bool,
    last_updated: Option<DateTime<Utc>>,
    last_applied_seq: u64,
    epoch: u64,
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    seq: u64,
    epoch: u64,
}

/// Owns the polling lifecycle and the per-cycle pipeline:
/// fetch, update forecast, append to history, evaluate alerts, notify.
///
/// Failures never escape a cycle; they only flip the connection state.
pub struct PollingController {
    source: Arc<dyn PredictionSource>,
    store: Mutex<SeriesStore>,
    settings: Arc<dyn SettingsProvider>,
    alerts: Arc<AlertService>,
    scheduler: Arc<dyn Scheduler>,
    config: PollingConfig,
    state: Mutex<PollState>,
    task: Mutex<Option<Box<dyn ScheduledTask>>>,
    next_seq: AtomicU64,
    events: broadcast::Sender<PollEvent>,
}

impl PollingController {
    pub fn new(
        source: Arc<dyn PredictionSource>,
        store: SeriesStore,
        settings: Arc<dyn SettingsProvider>,
        alerts: Arc<AlertService>,
        scheduler: Arc<dyn Scheduler>,
        config: PollingConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source,
            store: Mutex::new(store),
            settings,
            alerts,
            scheduler,
            config,
            state: Mutex::new(PollState {
                forecast: ForecastSet::default(),
                connection: ConnectionState::Disconnected,
                is_loading: true,
                last_updated: None,
                last_applied_seq: 0,
                epoch: 0,
            }),
            task: Mutex::new(None),
            next_seq: AtomicU64::new(0),
            events,
        }
    }

    /// Poll immediately, then every interval until [`PollingController::stop`].
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.is_some() {
            tracing::debug!("Polling already running");
            return;
        }

        {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.connection = ConnectionState::Connecting;
        }

        let weak = Arc::downgrade(self);
        let tick: Tick = Arc::new(move || {
            let weak = weak.clone();
            async move {
                if let Some(controller) = weak.upgrade() {
                    controller.run_cycle().await;
                }
            }
            .boxed()
        });

        *task = Some(self.scheduler.schedule_repeating(self.config.interval, tick));
        tracing::info!("Started polling every {}s", self.config.interval.as_secs());
    }

    /// Cancel future polls. A fetch already in flight is not cancelled.
    pub fn stop(&self) {
        let Some(task) = self.task.lock().take() else {
            return;
        };
        task.cancel();

        let mut state = self.state.lock();
        state.epoch += 1;
        state.connection = ConnectionState::Disconnected;
        tracing::info!("Stopped polling");
    }

    pub fn is_polling(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Run one cycle outside the timer cadence.
    pub async fn poll_now(&self) -> CycleOutcome {
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> CycleOutcome {
        let ticket = Ticket {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst) + 1,
            epoch: self.state.lock().epoch,
        };
        tracing::debug!("Polling cycle {} started", ticket.seq);

        let result = self.source.fetch_predictions().await;
        let now = Utc::now();

        match result {
            Ok(forecast) => self.apply_success(ticket, forecast, now).await,
            Err(e) => self.apply_failure(ticket, e),
        }
    }

    fn is_stale(&self, state: &PollState, ticket: Ticket) -> bool {
        match self.config.stale_policy {
            StaleResponsePolicy::LastCompletedWins => false,
            StaleResponsePolicy::DiscardStale => {
                ticket.seq < state.last_applied_seq || ticket.epoch != state.epoch
            }
        }
    }

    async fn apply_success(
        &self,
        ticket: Ticket,
        forecast: ForecastSet,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        {
            let mut state = self.state.lock();
            if self.is_stale(&state, ticket) {
                tracing::debug!("Discarding stale response from cycle {}", ticket.seq);
                return CycleOutcome::Discarded;
            }
            state.last_applied_seq = ticket.seq;
            state.forecast = forecast.clone();
            state.connection = ConnectionState::Connected;
            state.is_loading = false;
            state.last_updated = Some(now);
        }

        tracing::info!(
            "Received predictions: {:?} for minutes: {:?}",
            forecast.predictions(),
            forecast.lead_minutes()
        );

        let appended = match forecast.current() {
            Some(current) => self.store.lock().append(current, now).is_appended(),
            None => false,
        };

        let prefs = load_preferences(self.settings.as_ref());
        let decisions = evaluate(&forecast, &prefs);
        let alerts = self.alerts.dispatch(&decisions, now).await;

        let _ = self.events.send(PollEvent::Updated {
            snapshot: self.snapshot(),
            appended,
        });

        CycleOutcome::Updated { appended, alerts }
    }

    fn apply_failure(&self, ticket: Ticket, error: FetchError) -> CycleOutcome {
        {
            let mut state = self.state.lock();
            if self.is_stale(&state, ticket) {
                tracing::debug!("Discarding stale failure from cycle {}", ticket.seq);
                return CycleOutcome::Discarded;
            }
            state.last_applied_seq = ticket.seq;
            state.connection = ConnectionState::Disconnected;
            state.is_loading = false;
        }

        tracing::warn!("Error fetching predictions: {}", error);
        let _ = self.events.send(PollEvent::Disconnected {
            error: error.to_string(),
        });

        CycleOutcome::Failed(error.class())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection
    }

    pub fn snapshot(&self) -> ForecastSnapshot {
        let is_polling = self.is_polling();
        let state = self.state.lock();
        let current = state.forecast.current();
        ForecastSnapshot {
            connection: state.connection,
            is_loading: state.is_loading,
            is_polling,
            current,
            level: current.map(FatigueLevel::classify),
            forecast: state.forecast.clone(),
            chart_values: state.forecast.chart_values(),
            last_updated: state.last_updated,
        }
    }

    /// Historical readings for a chart range, oldest first.
    pub fn history(&self, range: TimeRange) -> Vec<FatigueReading> {
        self.store.lock().chart(range, Utc::now())
    }

    /// Historical readings newer than `since`, newest first.
    pub fn query_range(&self, since: Option<DateTime<Utc>>) -> Vec<FatigueReading> {
        self.store.lock().query_range(since)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    pub fn alerts(&self) -> &AlertService {
        &self.alerts
    }

    pub fn settings(&self) -> &Arc<dyn SettingsProvider> {
        &self.settings
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.cancel();
        }
    }
}
