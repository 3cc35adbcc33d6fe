// Test doubles for the application ports
use crate::application::ports::{
    NotificationGateway, PredictionSource, ScheduledTask, Scheduler, Tick,
};
use crate::domain::alert::Notification;
use crate::domain::forecast::ForecastSet;
use crate::error::{FetchError, GatewayError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

enum Scripted {
    Ready(Result<ForecastSet, FetchError>),
    Gated(oneshot::Receiver<Result<ForecastSet, FetchError>>),
}

/// Prediction source that replays queued responses in call order.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, predictions: Vec<f64>) {
        self.responses
            .lock()
            .push_back(Scripted::Ready(Ok(ForecastSet::new(predictions, None))));
    }

    pub fn push_err(&self, error: FetchError) {
        self.responses.lock().push_back(Scripted::Ready(Err(error)));
    }

    /// Queue a response that completes only when the returned sender fires.
    pub fn push_gated(&self) -> oneshot::Sender<Result<ForecastSet, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().push_back(Scripted::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionSource for ScriptedSource {
    async fn fetch_predictions(&self) -> Result<ForecastSet, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().pop_front();
        match next {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or(Err(FetchError::Timeout(10))),
            None => Err(FetchError::MissingPredictions),
        }
    }
}

/// Gateway that records what it was asked to deliver.
pub struct RecordingGateway {
    grant: bool,
    fail: AtomicBool,
    delivered: Mutex<Vec<Notification>>,
    clears: Mutex<(usize, usize)>,
}

impl RecordingGateway {
    pub fn new(grant: bool) -> Self {
        Self {
            grant,
            fail: AtomicBool::new(false),
            delivered: Mutex::new(Vec::new()),
            clears: Mutex::new((0, 0)),
        }
    }

    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }

    /// `(clear_all, clear_badge)` call counts.
    pub fn clear_calls(&self) -> (usize, usize) {
        *self.clears.lock()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn request_authorization(&self) -> bool {
        self.grant
    }

    async fn authorization_status(&self) -> bool {
        self.grant
    }

    async fn schedule_immediate(&self, notification: Notification) -> Result<(), GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Delivery("simulated".to_string()));
        }
        self.delivered.lock().push(notification);
        Ok(())
    }

    async fn clear_all(&self) {
        self.clears.lock().0 += 1;
    }

    async fn clear_badge(&self) {
        self.clears.lock().1 += 1;
    }
}

/// Scheduler that never fires on its own; tests drive ticks by hand.
#[derive(Default)]
pub struct ManualScheduler {
    registered: Mutex<Vec<(Duration, Tick, Arc<AtomicBool>)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> usize {
        self.registered.lock().len()
    }

    pub fn period(&self) -> Option<Duration> {
        self.registered.lock().last().map(|(period, _, _)| *period)
    }

    pub fn is_cancelled(&self) -> bool {
        self.registered
            .lock()
            .last()
            .is_some_and(|(_, _, cancelled)| cancelled.load(Ordering::SeqCst))
    }

    /// Run one tick of the most recent live registration. Returns false when
    /// there is nothing to run.
    pub async fn fire(&self) -> bool {
        let tick = {
            let registered = self.registered.lock();
            match registered.last() {
                Some((_, tick, cancelled)) if !cancelled.load(Ordering::SeqCst) => tick.clone(),
                _ => return false,
            }
        };
        tick().await;
        true
    }
}

struct ManualTask(Arc<AtomicBool>);

impl ScheduledTask for ManualTask {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, tick: Tick) -> Box<dyn ScheduledTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.registered.lock().push((period, tick, cancelled.clone()));
        Box::new(ManualTask(cancelled))
    }
}
