// Periodic task scheduling on the tokio runtime
use crate::application::ports::{ScheduledTask, Scheduler, Tick};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

/// Each tick is spawned as its own task, so cancelling the timer never
/// interrupts a tick that is already running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

struct TokioTask(AbortHandle);

impl ScheduledTask for TokioTask {
    fn cancel(&self) {
        self.0.abort();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, tick: Tick) -> Box<dyn ScheduledTask> {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tokio::spawn(tick());
            }
        });
        Box::new(TokioTask(handle.abort_handle()))
    }
}
