// Connectivity probe port
// reason: async-trait needed for object-safe async ports
use crate::domain::ProbeResult;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Probe infrastructure errors.
///
/// Ordinary network failures (timeout, unreachable, DNS) are NOT errors; they
/// come back as `ProbeResult { reachable: false, .. }`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Invalid probe target: {0}")]
    InvalidTarget(String),

    #[error("Probe tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Single reachability check against a target host
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Probe `target` once, blocking the calling task for at most `timeout`
    ///
    /// # Errors
    /// Only for misconfiguration or a broken probing mechanism
    async fn probe(&self, target: &str, timeout: Duration) -> Result<ProbeResult, ProbeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted outcome of one probe call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProbeOutcome {
        Reachable,
        Unreachable,
        /// Probe infrastructure failure
        Error(String),
    }

    /// Mock probe replaying a script, then repeating a fallback outcome
    pub struct ScriptedProbe {
        script: Mutex<VecDeque<ProbeOutcome>>,
        fallback: Mutex<ProbeOutcome>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProbe {
        pub fn new(script: impl IntoIterator<Item = ProbeOutcome>, fallback: ProbeOutcome) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                fallback: Mutex::new(fallback),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Reachability pattern followed by `fallback`
        pub fn from_pattern(pattern: &[bool], fallback: bool) -> Self {
            let to_outcome = |ok: bool| {
                if ok {
                    ProbeOutcome::Reachable
                } else {
                    ProbeOutcome::Unreachable
                }
            };
            Self::new(pattern.iter().map(|ok| to_outcome(*ok)), to_outcome(fallback))
        }

        pub fn always(reachable: bool) -> Self {
            Self::from_pattern(&[], reachable)
        }

        /// Replace the outcome used once the script runs out
        pub fn set_fallback(&self, outcome: ProbeOutcome) {
            *self.fallback.lock().unwrap() = outcome;
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Instants at which the probe was called
        pub fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConnectivityProbe for ScriptedProbe {
        async fn probe(&self, _target: &str, _timeout: Duration) -> Result<ProbeResult, ProbeError> {
            self.calls.lock().unwrap().push(Instant::now());

            let outcome = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.lock().unwrap().clone());

            let now = chrono::Utc::now();
            match outcome {
                ProbeOutcome::Reachable => {
                    Ok(ProbeResult::success(now, Some(Duration::from_millis(12))))
                }
                ProbeOutcome::Unreachable => Ok(ProbeResult::failure(now, "Request timed out")),
                ProbeOutcome::Error(msg) => Err(ProbeError::Io(msg)),
            }
        }
    }
}
