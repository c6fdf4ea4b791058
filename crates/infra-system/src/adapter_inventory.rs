// Network adapter inventory
// reason: sysinfo for cross-platform interface listing
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use sysinfo::Networks;
use tracing::debug;

/// One network interface as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInfo {
    pub name: String,
    /// Interface is up (Linux operstate) or has carried traffic
    pub active: bool,
    pub mac_address: String,
    pub received_bytes: u64,
    pub transmitted_bytes: u64,
}

impl AdapterInfo {
    pub fn is_loopback(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        name == "lo" || name.starts_with("lo0") || name.contains("loopback")
    }
}

/// Lists network interfaces for adapter selection
pub struct AdapterInventory {
    networks: Arc<Mutex<Networks>>,
}

impl AdapterInventory {
    pub fn new() -> Self {
        Self {
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
        }
    }

    /// Current interfaces, sorted by name
    pub fn list(&self) -> Vec<AdapterInfo> {
        let mut networks = match self.networks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        networks.refresh_list();

        let mut adapters: Vec<AdapterInfo> = networks
            .iter()
            .map(|(name, data)| {
                let received_bytes = data.total_received();
                let transmitted_bytes = data.total_transmitted();
                AdapterInfo {
                    name: name.clone(),
                    active: is_active(name, received_bytes + transmitted_bytes),
                    mac_address: data.mac_address().to_string(),
                    received_bytes,
                    transmitted_bytes,
                }
            })
            .collect();
        adapters.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(count = adapters.len(), "Adapter inventory refreshed");
        adapters
    }

    /// First active non-loopback interface
    pub fn default_adapter(&self) -> Option<AdapterInfo> {
        pick_default(&self.list())
    }
}

impl Default for AdapterInventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefers an active interface; falls back to any non-loopback one
pub fn pick_default(adapters: &[AdapterInfo]) -> Option<AdapterInfo> {
    adapters
        .iter()
        .filter(|a| !a.is_loopback())
        .find(|a| a.active)
        .or_else(|| adapters.iter().find(|a| !a.is_loopback()))
        .cloned()
}

#[cfg(target_os = "linux")]
fn is_active(name: &str, _traffic: u64) -> bool {
    std::fs::read_to_string(format!("/sys/class/net/{}/operstate", name))
        .map(|state| state.trim() == "up")
        .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
fn is_active(_name: &str, traffic: u64) -> bool {
    traffic > 0
}
