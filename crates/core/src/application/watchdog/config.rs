// Watchdog configuration
use super::constants::*;
use crate::error::{AppError, Result};
use std::time::Duration;

/// What happens to the outage timer after a recovery cycle exhausts its retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostExhaustionPolicy {
    /// Keep measuring from the adapter re-enable; the next failed tick past
    /// the threshold starts another cycle right away
    #[default]
    KeepAccumulating,
    /// Restart the timer at exhaustion, granting a fresh grace period
    RestartGracePeriod,
}

impl std::str::FromStr for PostExhaustionPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep_accumulating" => Ok(Self::KeepAccumulating),
            "restart" | "restart_grace_period" => Ok(Self::RestartGracePeriod),
            other => Err(AppError::Config(format!(
                "Unknown post-exhaustion policy '{}' (expected keep|restart)",
                other
            ))),
        }
    }
}

/// Timings and target of one monitoring session
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    pub target: String,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
    pub outage_threshold: Duration,
    pub settle_delay: Duration,
    pub retry_delay: Duration,
    pub max_recovery_attempts: u32,
    pub adapter_timeout: Duration,
    pub post_exhaustion: PostExhaustionPolicy,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            poll_interval: POLL_INTERVAL,
            probe_timeout: PROBE_TIMEOUT,
            outage_threshold: OUTAGE_THRESHOLD,
            settle_delay: SETTLE_DELAY,
            retry_delay: RETRY_DELAY,
            max_recovery_attempts: MAX_RECOVERY_ATTEMPTS,
            adapter_timeout: ADAPTER_COMMAND_TIMEOUT,
            post_exhaustion: PostExhaustionPolicy::default(),
        }
    }
}

impl WatchdogConfig {
    /// Reject values that would make the loop spin or never escalate
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(AppError::Config("Probe target must not be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(AppError::Config("Poll interval must be positive".to_string()));
        }
        if self.probe_timeout.is_zero() {
            return Err(AppError::Config("Probe timeout must be positive".to_string()));
        }
        if self.adapter_timeout.is_zero() {
            return Err(AppError::Config("Adapter timeout must be positive".to_string()));
        }
        if self.max_recovery_attempts == 0 {
            return Err(AppError::Config(
                "At least one recovery attempt is required".to_string(),
            ));
        }
        Ok(())
    }
}
