// Watchdog status snapshot published to presentation layers
use crate::domain::{ConnectivityState, ProbeResult, WatchdogState};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a monitoring session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchdogSnapshot {
    pub state: WatchdogState,
    pub connectivity: ConnectivityState,
    pub adapter: Option<String>,
    /// Seconds since the current outage window opened
    pub outage_secs: Option<u64>,
    pub recovery_cycles: u32,
    pub alerts_raised: u32,
    /// Set when a recovery cycle exhausted its retries and the outage persists
    pub unresolved: bool,
    pub last_probe: Option<ProbeResult>,
}
