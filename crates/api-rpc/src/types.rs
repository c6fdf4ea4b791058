//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use chrono::{DateTime, Utc};
use netguard_infra_system::AdapterInfo;
use serde::{Deserialize, Serialize};

/// monitor.start.v1 - Start monitoring an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub adapter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    pub adapter: String,
    pub started_at: DateTime<Utc>,
}

/// monitor.stop.v1 - Stop the current session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    /// False when nothing was running
    pub stopped: bool,
}

/// monitor.status.v1 - No parameters; result is `MonitorStatus`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusRequest {}

/// logs.tail.v1 - Recent log lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailLogsRequest {
    #[serde(default = "default_lines")]
    pub lines: usize,
}

impl Default for TailLogsRequest {
    fn default() -> Self {
        Self {
            lines: default_lines(),
        }
    }
}

fn default_lines() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailLogsResponse {
    pub lines: Vec<String>,
}

/// adapters.list.v1 - Network interfaces
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAdaptersRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterEntry {
    pub name: String,
    pub active: bool,
}

impl From<AdapterInfo> for AdapterEntry {
    fn from(info: AdapterInfo) -> Self {
        Self {
            name: info.name,
            active: info.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAdaptersResponse {
    pub adapters: Vec<AdapterEntry>,
}
