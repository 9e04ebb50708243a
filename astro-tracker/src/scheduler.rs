//! Toggle-driven polling timer.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::tracker::TrackerEvent;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(10);

/// Whether automatic tracking is running
#[derive(Debug, Default)]
pub enum TrackingState {
    #[default]
    Paused,
    /// The ticker task is owned here and aborted on the way out
    Active { ticker: JoinHandle<()> },
}

impl TrackingState {
    pub fn is_active(&self) -> bool {
        matches!(self, TrackingState::Active { .. })
    }
}

/// Emits [`TrackerEvent::Tick`] every `period` while active.
///
/// The ticker waits a full period before its first tick; the caller is
/// expected to issue the immediate batch itself.
pub struct TrackingScheduler {
    period: Duration,
    state: TrackingState,
    events: UnboundedSender<TrackerEvent>,
}

impl TrackingScheduler {
    pub fn new(period: Duration, events: UnboundedSender<TrackerEvent>) -> Self {
        Self {
            period,
            state: TrackingState::Paused,
            events,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Paused -> Active. Returns `false` if a ticker is already running.
    pub fn start(&mut self) -> bool {
        if self.state.is_active() {
            tracing::warn!("Tracking already active, not starting a second timer");
            return false;
        }

        let events = self.events.clone();
        let period = self.period;
        let ticker = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(TrackerEvent::Tick).is_err() {
                    tracing::debug!("Tracker loop gone, ticker exiting");
                    break;
                }
            }
        });

        self.state = TrackingState::Active { ticker };
        tracing::info!("Tracking started (interval: {}s)", self.period.as_secs());
        true
    }

    /// Active -> Paused. Returns `false` if nothing was running.
    pub fn stop(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            TrackingState::Active { ticker } => {
                ticker.abort();
                tracing::info!("Tracking stopped");
                true
            }
            TrackingState::Paused => {
                tracing::warn!("Tracking already paused, nothing to stop");
                false
            }
        }
    }

    /// Flip the state. Returns whether tracking is now active.
    pub fn toggle(&mut self) -> bool {
        if self.state.is_active() {
            self.stop();
        } else {
            self.start();
        }
        self.state.is_active()
    }
}

impl Drop for TrackingScheduler {
    fn drop(&mut self) {
        if let TrackingState::Active { ticker } = &self.state {
            ticker.abort();
        }
    }
}
