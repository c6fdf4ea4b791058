// Application Layer - Use Cases and Business Logic

pub mod monitor;
pub mod watchdog;

// Re-exports
pub use monitor::{MonitorService, MonitorStatus, SessionInfo};
pub use watchdog::{
    shutdown_channel, PostExhaustionPolicy, ShutdownSender, ShutdownToken, WatchdogConfig,
    WatchdogController, WatchdogSnapshot,
};
