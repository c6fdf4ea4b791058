//! Shared wiring: MonitorService + scripted mocks + the real event pipeline

#![allow(dead_code)]

use async_trait::async_trait;
use netguard_core::application::{MonitorService, WatchdogConfig};
use netguard_core::domain::Alert;
use netguard_core::port::adapter_controller::mocks::RecordingAdapterController;
use netguard_core::port::connectivity_probe::mocks::ScriptedProbe;
use netguard_core::port::id_provider::mocks::SequentialIdProvider;
use netguard_core::port::time_provider::SystemTimeProvider;
use netguard_core::port::AdapterAction;
use netguard_infra_system::{event_channel, EventDispatcher, LogHistory, Notifier};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Notifier recording each alert with the (virtual) instant it arrived
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<(Alert, Instant)>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<(Alert, Instant)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &Alert) {
        self.seen.lock().unwrap().push((alert.clone(), Instant::now()));
    }
}

pub struct Pipeline {
    pub monitor: MonitorService,
    pub probe: Arc<ScriptedProbe>,
    pub adapter: Arc<RecordingAdapterController>,
    pub history: LogHistory,
    pub notifier: Arc<RecordingNotifier>,
    pub dispatcher: JoinHandle<()>,
    pub start: Instant,
}

impl Pipeline {
    pub fn new(probe: ScriptedProbe, adapter: RecordingAdapterController) -> Self {
        Self::with_config(probe, adapter, WatchdogConfig::default())
    }

    pub fn with_config(
        probe: ScriptedProbe,
        adapter: RecordingAdapterController,
        config: WatchdogConfig,
    ) -> Self {
        let probe = Arc::new(probe);
        let adapter = Arc::new(adapter);
        let history = LogHistory::new(200);
        let notifier = Arc::new(RecordingNotifier::default());

        let (sink, rx) = event_channel();
        let dispatcher = tokio::spawn(
            EventDispatcher::new(rx, history.clone(), notifier.clone()).run(),
        );

        let monitor = MonitorService::new(
            config,
            probe.clone(),
            adapter.clone(),
            Arc::new(sink),
            Arc::new(SystemTimeProvider),
            Arc::new(SequentialIdProvider::default()),
        );

        Self {
            monitor,
            probe,
            adapter,
            history,
            notifier,
            dispatcher,
            start: Instant::now(),
        }
    }

    /// Sleep until `secs` after the pipeline was built
    pub async fn advance_to(&self, secs: f64) {
        tokio::time::sleep_until(self.start + Duration::from_secs_f64(secs)).await;
    }

    pub fn offset(&self, at: Instant) -> u64 {
        (at - self.start).as_secs()
    }

    pub fn probe_offsets(&self) -> Vec<u64> {
        self.probe
            .call_times()
            .into_iter()
            .map(|at| self.offset(at))
            .collect()
    }

    pub fn adapter_offsets(&self, action: AdapterAction) -> Vec<u64> {
        self.adapter
            .calls()
            .into_iter()
            .filter(|c| c.action == action)
            .map(|c| self.offset(c.at))
            .collect()
    }

    pub fn count_message(&self, message: &str) -> usize {
        self.history
            .messages()
            .iter()
            .filter(|m| m.as_str() == message)
            .count()
    }

    /// Stop monitoring and wait for every queued event to be dispatched
    pub async fn shutdown(self) -> LogHistory {
        self.monitor.stop().await.unwrap();
        drop(self.monitor);
        self.dispatcher.await.unwrap();
        self.history
    }
}
