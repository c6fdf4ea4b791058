//! Monitor Service - monitoring session lifecycle
//!
//! One session at a time. `start` validates the adapter before anything is
//! spawned; `stop` is idempotent and waits (bounded) for the worker to exit.
//! Until that wait resolves the slot stays claimed and `start` conflicts.
//! Each start builds a fresh [`WatchdogController`], so no outage timer or
//! connectivity state survives a restart.

use crate::application::watchdog::constants::{
    MSG_MONITORING_STARTED, MSG_MONITORING_STOPPED, WORKER_JOIN_TIMEOUT,
};
use crate::application::watchdog::{
    shutdown_channel, ShutdownSender, WatchdogConfig, WatchdogController, WatchdogSnapshot,
};
use crate::domain::AdapterHandle;
use crate::error::{AppError, Result};
use crate::port::{AdapterController, ConnectivityProbe, EventSink, IdProvider, TimeProvider};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Identity of a running session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub adapter: AdapterHandle,
    pub started_at: DateTime<Utc>,
}

/// Status reported to control surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub session: Option<SessionInfo>,
    pub watchdog: WatchdogSnapshot,
}

struct ActiveSession {
    info: SessionInfo,
    shutdown: ShutdownSender,
    handle: JoinHandle<()>,
    status: watch::Receiver<WatchdogSnapshot>,
}

/// Starts and stops monitoring sessions
pub struct MonitorService {
    config: WatchdogConfig,
    probe: Arc<dyn ConnectivityProbe>,
    adapter_controller: Arc<dyn AdapterController>,
    events: Arc<dyn EventSink>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    active: Mutex<Option<ActiveSession>>,
    /// Set while a stopped worker is still winding down
    stopping: Arc<AtomicBool>,
}

impl MonitorService {
    pub fn new(
        config: WatchdogConfig,
        probe: Arc<dyn ConnectivityProbe>,
        adapter_controller: Arc<dyn AdapterController>,
        events: Arc<dyn EventSink>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            config,
            probe,
            adapter_controller,
            events,
            time_provider,
            id_provider,
            active: Mutex::new(None),
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Start monitoring `adapter`
    ///
    /// # Errors
    /// - `AppError::Config` if no adapter is given or the config is invalid
    /// - `AppError::Conflict` if a session is running or still stopping
    pub async fn start(&self, adapter: &str) -> Result<SessionInfo> {
        let adapter = AdapterHandle::new(adapter)
            .map_err(|e| AppError::Config(format!("Please select a network adapter ({})", e)))?;
        self.config.validate()?;

        let mut active = self.active.lock().await;
        if self.stopping.load(Ordering::Acquire) {
            return Err(AppError::Conflict(
                "Previous monitoring session is still stopping".to_string(),
            ));
        }
        if let Some(session) = active.as_ref() {
            if !session.handle.is_finished() {
                return Err(AppError::Conflict(format!(
                    "Monitoring already running on adapter {} (session {})",
                    session.info.adapter, session.info.session_id
                )));
            }
            warn!(
                session_id = %session.info.session_id,
                "Previous monitoring worker exited unexpectedly, replacing session"
            );
        }

        let info = SessionInfo {
            session_id: self.id_provider.generate_id(),
            adapter: adapter.clone(),
            started_at: self.time_provider.now(),
        };

        self.log(MSG_MONITORING_STARTED);

        let controller = WatchdogController::new(
            adapter.clone(),
            self.config.clone(),
            Arc::clone(&self.probe),
            Arc::clone(&self.adapter_controller),
            Arc::clone(&self.events),
            Arc::clone(&self.time_provider),
        );
        let status = controller.subscribe();
        let (shutdown, token) = shutdown_channel();
        let handle = tokio::spawn(controller.run(token));

        self.log(&format!("Monitoring started on adapter: {}", adapter));
        info!(session_id = %info.session_id, adapter = %adapter, "Monitoring session started");

        *active = Some(ActiveSession {
            info: info.clone(),
            shutdown,
            handle,
            status,
        });
        Ok(info)
    }

    /// Stop the running session, if any.
    ///
    /// Returns false when nothing was running.
    pub async fn stop(&self) -> Result<bool> {
        let session = {
            let mut active = self.active.lock().await;
            let Some(session) = active.take() else {
                return Ok(false);
            };
            // Claimed under the lock so a concurrent start cannot slip in
            self.stopping.store(true, Ordering::Release);
            session
        };
        session.shutdown.shutdown();

        let join_timeout = self.join_deadline();
        let stopping = Arc::clone(&self.stopping);
        let events = Arc::clone(&self.events);
        let time_provider = Arc::clone(&self.time_provider);

        // Spawned so the slot is released even if the caller goes away
        let reaper = tokio::spawn(async move {
            reap_worker(session, join_timeout).await;
            events.log_event(MSG_MONITORING_STOPPED, time_provider.now());
            stopping.store(false, Ordering::Release);
        });
        if let Err(e) = reaper.await {
            error!("Session reaper failed: {:?}", e);
            self.stopping.store(false, Ordering::Release);
        }
        Ok(true)
    }

    /// Worst case: a probe in flight, then a disable and the re-enable
    /// that always follows it.
    fn join_deadline(&self) -> Duration {
        self.config.probe_timeout + self.config.adapter_timeout * 2 + WORKER_JOIN_TIMEOUT
    }

    pub async fn is_running(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|s| !s.handle.is_finished())
            .unwrap_or(false)
    }

    pub async fn status(&self) -> MonitorStatus {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(session) => MonitorStatus {
                running: !session.handle.is_finished(),
                session: Some(session.info.clone()),
                watchdog: session.status.borrow().clone(),
            },
            None => MonitorStatus {
                running: false,
                session: None,
                watchdog: WatchdogSnapshot::default(),
            },
        }
    }

    fn log(&self, message: &str) {
        self.events.log_event(message, self.time_provider.now());
    }
}

async fn reap_worker(session: ActiveSession, join_timeout: Duration) {
    let ActiveSession {
        info, mut handle, ..
    } = session;

    match tokio::time::timeout(join_timeout, &mut handle).await {
        Ok(Ok(())) => {}
        Ok(Err(join_err)) => {
            if join_err.is_panic() {
                error!(session_id = %info.session_id, "Watchdog worker panicked: {:?}", join_err);
            } else {
                error!(session_id = %info.session_id, "Watchdog worker cancelled: {:?}", join_err);
            }
        }
        Err(_) => {
            warn!(
                session_id = %info.session_id,
                timeout_ms = join_timeout.as_millis() as u64,
                "Watchdog worker did not stop in time, aborting"
            );
            handle.abort();
        }
    }
    info!(session_id = %info.session_id, "Monitoring session stopped");
}
