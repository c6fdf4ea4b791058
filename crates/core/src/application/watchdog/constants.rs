// Watchdog constants (No magic values)
use std::time::Duration;

/// Delay between ordinary probes (1s)
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Continuous outage after which the adapter is cycled (15s)
pub const OUTAGE_THRESHOLD: Duration = Duration::from_secs(15);

/// Pause between disabling and re-enabling the adapter (5s)
pub const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Wait before each post-recovery probe (5s)
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Post-recovery probes per recovery cycle
pub const MAX_RECOVERY_ATTEMPTS: u32 = 3;

/// Upper bound for a single probe (2s)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadline for one enable/disable call (30s)
pub const ADAPTER_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Well-known public resolver used as the reachability target
pub const DEFAULT_TARGET: &str = "1.1.1.1";

/// Slack on top of in-flight probe and adapter deadlines when stopping (5s)
pub const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

// Event log messages
pub const MSG_ONLINE: &str = "Network is online.";
pub const MSG_OFFLINE: &str = "Network is offline.";
pub const MSG_RESTORED: &str = "Connection restored.";
pub const MSG_RECOVERY_FAILED: &str = "Unable to restore the connection after adapter restart.";
pub const MSG_REESTABLISHING: &str = "Attempting to reestablish connectivity...";
pub const MSG_MONITORING_STARTED: &str = "Starting network monitoring...";
pub const MSG_MONITORING_STOPPED: &str = "Monitoring stopped.";

// Alert raised once per exhausted recovery cycle
pub const ALERT_TITLE: &str = "Network Issue";
pub const ALERT_MESSAGE: &str = "Unable to restore connection after adapter restart.";
