// Domain Layer - Pure watchdog entities

pub mod adapter;
pub mod connectivity;
pub mod error;
pub mod event;
pub mod probe;

// Re-exports
pub use adapter::AdapterHandle;
pub use connectivity::{
    ConnectivityState, ConnectivityTransition, OutageWindow, RecoveryAttempt, WatchdogState,
};
pub use error::DomainError;
pub use event::{format_log_line, Alert, LogLine, MonitorEvent, LOG_TIMESTAMP_FORMAT};
pub use probe::ProbeResult;
