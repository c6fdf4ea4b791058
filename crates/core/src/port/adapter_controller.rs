// Adapter Controller Port
// Abstraction for enabling/disabling a network interface

use crate::domain::AdapterHandle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Adapter control action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterAction {
    Enable,
    Disable,
}

impl AdapterAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterAction::Enable => "enable",
            AdapterAction::Disable => "disable",
        }
    }

    /// Past tense used in the event log ("Enabled", "Disabled")
    pub fn past_tense(&self) -> &'static str {
        match self {
            AdapterAction::Enable => "Enabled",
            AdapterAction::Disable => "Disabled",
        }
    }
}

impl std::fmt::Display for AdapterAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter control errors (never fatal to the watchdog)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("{action} of '{adapter}' failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        action: AdapterAction,
        adapter: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Adapter command timed out after {0}ms")]
    Timeout(u64),

    #[error("Adapter control unsupported: {0}")]
    Unsupported(String),
}

/// Adapter Controller trait
///
/// Implementations must treat a call that finds the adapter already in the
/// target state as success.
#[async_trait]
pub trait AdapterController: Send + Sync {
    async fn enable(&self, adapter: &AdapterHandle) -> Result<(), AdapterError>;

    async fn disable(&self, adapter: &AdapterHandle) -> Result<(), AdapterError>;

    /// Dispatch on `action`
    async fn apply(&self, action: AdapterAction, adapter: &AdapterHandle) -> Result<(), AdapterError> {
        match action {
            AdapterAction::Enable => self.enable(adapter).await,
            AdapterAction::Disable => self.disable(adapter).await,
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Mock controller behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Sleep before succeeding (for deadline testing)
        Hang(Duration),
    }

    /// One recorded adapter call
    #[derive(Debug, Clone)]
    pub struct AdapterCall {
        pub action: AdapterAction,
        pub adapter: String,
        pub at: Instant,
    }

    /// Mock Adapter Controller recording every call
    pub struct RecordingAdapterController {
        behavior: Mutex<MockBehavior>,
        calls: Mutex<Vec<AdapterCall>>,
    }

    impl RecordingAdapterController {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                calls: Mutex::new(Vec::new()),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn new_hanging(delay: Duration) -> Self {
            Self::new(MockBehavior::Hang(delay))
        }
        pub fn calls(&self) -> Vec<AdapterCall> {
            self.calls.lock().unwrap().clone()
        }
        pub fn actions(&self) -> Vec<AdapterAction> {
            self.calls().into_iter().map(|c| c.action).collect()
        }
        pub fn count(&self, action: AdapterAction) -> usize {
            self.calls().iter().filter(|c| c.action == action).count()
        }

        async fn record(&self, action: AdapterAction, adapter: &AdapterHandle) -> Result<(), AdapterError> {
            self.calls.lock().unwrap().push(AdapterCall {
                action,
                adapter: adapter.to_string(),
                at: Instant::now(),
            });

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(AdapterError::CommandFailed {
                    action,
                    adapter: adapter.to_string(),
                    exit_code: Some(1),
                    stderr: msg,
                }),
                MockBehavior::Hang(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
            }
        }
    }

    #[async_trait]
    impl AdapterController for RecordingAdapterController {
        async fn enable(&self, adapter: &AdapterHandle) -> Result<(), AdapterError> {
            self.record(AdapterAction::Enable, adapter).await
        }
        async fn disable(&self, adapter: &AdapterHandle) -> Result<(), AdapterError> {
            self.record(AdapterAction::Disable, adapter).await
        }
    }
}
