// WHY: bounds how often a pointer move turns into a highlight pass
// Throttle gates which moves are seen at all; debounce waits for a short quiet period before firing

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::highlight::PointerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Minimum spacing between accepted moves
    pub throttle: Duration,
    /// Quiet period between an accepted move and firing it
    pub debounce: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(100),
            debounce: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Pending { event: PointerEvent, fire_at: Instant },
}

/// Throttle + debounce state machine with a single timer.
///
/// Time is passed in by the caller so the machine itself never sleeps.
#[derive(Debug)]
pub struct PointerScheduler {
    config: SchedulerConfig,
    state: State,
    throttle_until: Option<Instant>,
}

impl PointerScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            throttle_until: None,
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Offer a move; returns whether it was accepted by the throttle
    pub fn on_move(&mut self, event: PointerEvent, now: Instant) -> bool {
        if let Some(until) = self.throttle_until {
            if now < until {
                trace!("Pointer move throttled");
                return false;
            }
        }
        self.throttle_until = Some(now + self.config.throttle);
        self.state = State::Pending {
            event,
            fire_at: now + self.config.debounce,
        };
        true
    }

    /// Take the pending event once its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<PointerEvent> {
        match self.state {
            State::Pending { event, fire_at } if now >= fire_at => {
                self.state = State::Idle;
                Some(event)
            }
            _ => None,
        }
    }

    /// When the pending event becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Pending { fire_at, .. } => Some(fire_at),
            State::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }

    /// Drop any pending event and reopen the throttle
    pub fn cancel(&mut self) {
        self.state = State::Idle;
        self.throttle_until = None;
    }
}

impl Default for PointerScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
