// Adapter Handle - identifies the network interface under management

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Opaque name of the network interface the watchdog is allowed to cycle.
///
/// Set once before a session starts and never mutated by the watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdapterHandle(String);

impl AdapterHandle {
    /// Build a handle from a user-supplied interface name.
    ///
    /// Surrounding whitespace is trimmed; a blank name is rejected.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyAdapterHandle);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AdapterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AdapterHandle {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AdapterHandle> for String {
    fn from(handle: AdapterHandle) -> Self {
        handle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_handle_rejected() {
        assert_eq!(AdapterHandle::new(""), Err(DomainError::EmptyAdapterHandle));
        assert_eq!(AdapterHandle::new("   "), Err(DomainError::EmptyAdapterHandle));
    }

    #[test]
    fn test_handle_is_trimmed() {
        let handle = AdapterHandle::new("  Wi-Fi ").unwrap();
        assert_eq!(handle.as_str(), "Wi-Fi");
        assert_eq!(handle.to_string(), "Wi-Fi");
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        let ok: AdapterHandle = serde_json::from_str("\"eth0\"").unwrap();
        assert_eq!(ok.as_str(), "eth0");
        assert!(serde_json::from_str::<AdapterHandle>("\"\"").is_err());
    }
}
