// Connectivity Domain Model - states, outage window, recovery counter

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Last known reachability of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// A change of reachability produced by [`ConnectivityState::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityTransition {
    /// First observation of a session was reachable (Unknown -> Online)
    Established,
    /// Offline -> Online
    WentOnline,
    /// Unknown/Online -> Offline
    WentOffline,
}

impl ConnectivityState {
    /// Fold one probe outcome into the state.
    ///
    /// Returns a transition only when reachability actually changed, so a run
    /// of identical probe results yields at most one transition.
    pub fn observe(&mut self, reachable: bool) -> Option<ConnectivityTransition> {
        let (next, transition) = match (*self, reachable) {
            (ConnectivityState::Online, true) | (ConnectivityState::Offline, false) => {
                return None
            }
            (ConnectivityState::Unknown, true) => {
                (ConnectivityState::Online, ConnectivityTransition::Established)
            }
            (ConnectivityState::Offline, true) => {
                (ConnectivityState::Online, ConnectivityTransition::WentOnline)
            }
            (_, false) => (ConnectivityState::Offline, ConnectivityTransition::WentOffline),
        };
        *self = next;
        Some(transition)
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::Unknown => write!(f, "UNKNOWN"),
            ConnectivityState::Online => write!(f, "ONLINE"),
            ConnectivityState::Offline => write!(f, "OFFLINE"),
        }
    }
}

/// Watchdog state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchdogState {
    /// Not monitoring
    #[default]
    Idle,
    /// Polling, target reachable (or not yet observed)
    Monitoring,
    /// Offline, outage timer below threshold
    Degrading,
    /// Adapter cycle and retry loop in progress
    Recovering,
    /// Retries exhausted; polling continues with the outage unresolved
    AlertRaised,
}

impl WatchdogState {
    /// True while a session owns a running worker
    pub fn is_active(&self) -> bool {
        !matches!(self, WatchdogState::Idle)
    }
}

impl std::fmt::Display for WatchdogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchdogState::Idle => write!(f, "IDLE"),
            WatchdogState::Monitoring => write!(f, "MONITORING"),
            WatchdogState::Degrading => write!(f, "DEGRADING"),
            WatchdogState::Recovering => write!(f, "RECOVERING"),
            WatchdogState::AlertRaised => write!(f, "ALERT_RAISED"),
        }
    }
}

/// Contiguous offline run tracker.
///
/// `started_at` is set at most once per run; [`OutageWindow::restart`] is the
/// only way to move it forward without clearing the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutageWindow {
    started_at: Option<Instant>,
}

impl OutageWindow {
    /// Open the window at `now`. Returns false if it was already open.
    pub fn open(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Restart the timer after an adapter cycle (post-recovery observation window)
    pub fn restart(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.started_at = None;
    }

    pub fn is_open(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Time since the window opened, zero when closed
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }
}

/// Retry counter scoped to a single recovery cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryAttempt {
    pub attempts_made: u32,
    pub max_attempts: u32,
}

impl RecoveryAttempt {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts_made: 0,
            max_attempts,
        }
    }

    /// Consume one attempt. Returns the 1-based attempt number, or None once exhausted.
    pub fn next(&mut self) -> Option<u32> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts_made += 1;
        Some(self.attempts_made)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_made)
    }
}
