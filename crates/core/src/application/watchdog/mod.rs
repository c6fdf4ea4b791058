// Watchdog - outage detection and self-healing loop

pub mod config;
pub mod constants;
mod shutdown;
pub mod status;

use constants::*;
pub use config::{PostExhaustionPolicy, WatchdogConfig};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use status::WatchdogSnapshot;

use crate::domain::{
    AdapterHandle, ConnectivityState, ConnectivityTransition, OutageWindow, ProbeResult,
    RecoveryAttempt, WatchdogState,
};
use crate::port::{
    AdapterAction, AdapterController, AdapterError, ConnectivityProbe, EventSink, TimeProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// Whether the loop keeps going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Session-scoped watchdog state, discarded when the session ends
#[derive(Debug, Default)]
struct Session {
    state: WatchdogState,
    connectivity: ConnectivityState,
    outage: OutageWindow,
    recovery_cycles: u32,
    alerts_raised: u32,
    unresolved: bool,
    last_probe: Option<ProbeResult>,
}

/// Runs one monitoring session: probe, classify, escalate, recover.
///
/// Strictly sequential; the only suspension points are the poll interval,
/// the settle delay and the retry delays, each raced against the stop signal.
pub struct WatchdogController {
    adapter: AdapterHandle,
    config: WatchdogConfig,
    probe: Arc<dyn ConnectivityProbe>,
    adapter_controller: Arc<dyn AdapterController>,
    events: Arc<dyn EventSink>,
    time_provider: Arc<dyn TimeProvider>,
    status_tx: watch::Sender<WatchdogSnapshot>,
    session: Session,
}

impl WatchdogController {
    pub fn new(
        adapter: AdapterHandle,
        config: WatchdogConfig,
        probe: Arc<dyn ConnectivityProbe>,
        adapter_controller: Arc<dyn AdapterController>,
        events: Arc<dyn EventSink>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let (status_tx, _) = watch::channel(WatchdogSnapshot {
            adapter: Some(adapter.to_string()),
            ..Default::default()
        });
        Self {
            adapter,
            config,
            probe,
            adapter_controller,
            events,
            time_provider,
            status_tx,
            session: Session::default(),
        }
    }

    /// Subscribe to status snapshots (published after every step)
    pub fn subscribe(&self) -> watch::Receiver<WatchdogSnapshot> {
        self.status_tx.subscribe()
    }

    /// Run the monitoring loop until stop is requested
    pub async fn run(mut self, mut shutdown: ShutdownToken) {
        info!(
            adapter = %self.adapter,
            probe_target = %self.config.target,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Watchdog started"
        );
        self.set_state(WatchdogState::Monitoring);

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            let flow = if self.probe_once().await {
                self.on_reachable();
                Flow::Continue
            } else {
                self.on_unreachable(&mut shutdown).await
            };
            self.publish();

            if flow == Flow::Stop || !self.pause(self.config.poll_interval, &mut shutdown).await {
                break;
            }
        }

        self.set_state(WatchdogState::Idle);
        info!(adapter = %self.adapter, "Watchdog stopped");
    }

    /// Sleep for `duration`; false if stop was requested first
    async fn pause(&self, duration: Duration, shutdown: &mut ShutdownToken) -> bool {
        tokio::select! {
            biased;
            _ = shutdown.wait() => false,
            _ = sleep(duration) => true,
        }
    }

    /// Probe the target once and fold the result into connectivity state.
    ///
    /// Probe infrastructure errors are logged and count as unreachable.
    async fn probe_once(&mut self) -> bool {
        let result = match self
            .probe
            .probe(&self.config.target, self.config.probe_timeout)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, probe_target = %self.config.target, "Probe infrastructure failure");
                self.log(format!("An error occurred while pinging: {}", e));
                ProbeResult::failure(self.time_provider.now(), e.to_string())
            }
        };

        let reachable = result.reachable;
        debug!(
            reachable,
            latency_ms = ?result.latency_ms(),
            error = ?result.error,
            "Probe completed"
        );

        match self.session.connectivity.observe(reachable) {
            Some(ConnectivityTransition::WentOffline) => self.log(MSG_OFFLINE),
            Some(ConnectivityTransition::WentOnline) => self.log(MSG_ONLINE),
            Some(ConnectivityTransition::Established) => {
                debug!(probe_target = %self.config.target, "Initial connectivity established")
            }
            None => {}
        }
        self.session.last_probe = Some(result);
        reachable
    }

    fn on_reachable(&mut self) {
        self.session.outage.clear();
        self.session.unresolved = false;
        if self.session.state != WatchdogState::Monitoring {
            self.set_state(WatchdogState::Monitoring);
        }
    }

    async fn on_unreachable(&mut self, shutdown: &mut ShutdownToken) -> Flow {
        let now = Instant::now();
        if self.session.outage.open(now) {
            debug!(adapter = %self.adapter, "Outage window opened");
        }
        // After an exhausted cycle the alert lives on in `unresolved` only
        if matches!(
            self.session.state,
            WatchdogState::Monitoring | WatchdogState::AlertRaised
        ) {
            self.set_state(WatchdogState::Degrading);
        }

        let elapsed = self.session.outage.elapsed(now);
        if elapsed < self.config.outage_threshold {
            return Flow::Continue;
        }
        self.recover(elapsed, shutdown).await
    }

    /// One recovery cycle: disable, settle, enable, bounded re-probing
    async fn recover(&mut self, elapsed: Duration, shutdown: &mut ShutdownToken) -> Flow {
        // Stop arrived during the probe: do not start a cycle we must undo
        if shutdown.is_shutdown() {
            return Flow::Stop;
        }
        self.session.recovery_cycles += 1;
        self.set_state(WatchdogState::Recovering);
        warn!(
            adapter = %self.adapter,
            elapsed_secs = elapsed.as_secs(),
            cycle = self.session.recovery_cycles,
            "Outage threshold crossed, cycling adapter"
        );
        self.log(format!(
            "Network is offline for {} seconds. Restarting adapter...",
            elapsed.as_secs()
        ));

        self.cycle_adapter(AdapterAction::Disable).await;
        if !self.pause(self.config.settle_delay, shutdown).await {
            // Never leave the interface down on stop
            self.cycle_adapter(AdapterAction::Enable).await;
            return Flow::Stop;
        }
        self.cycle_adapter(AdapterAction::Enable).await;

        self.session.outage.restart(Instant::now());
        self.log(MSG_REESTABLISHING);
        self.publish();

        let mut attempt = RecoveryAttempt::new(self.config.max_recovery_attempts);
        while let Some(n) = attempt.next() {
            if !self.pause(self.config.retry_delay, shutdown).await {
                return Flow::Stop;
            }
            if self.probe_once().await {
                info!(adapter = %self.adapter, attempt = n, "Connectivity restored after adapter cycle");
                self.log(MSG_RESTORED);
                self.on_reachable();
                return Flow::Continue;
            }
            debug!(attempt = n, remaining = attempt.remaining(), "Recovery probe failed");
            self.publish();
        }

        self.log(MSG_RECOVERY_FAILED);
        self.events.raise_alert(ALERT_TITLE, ALERT_MESSAGE);
        self.session.alerts_raised += 1;
        self.session.unresolved = true;
        self.set_state(WatchdogState::AlertRaised);
        warn!(
            adapter = %self.adapter,
            attempts = self.config.max_recovery_attempts,
            policy = ?self.config.post_exhaustion,
            "Recovery retries exhausted, alert raised"
        );

        if self.config.post_exhaustion == PostExhaustionPolicy::RestartGracePeriod {
            self.session.outage.restart(Instant::now());
        }
        Flow::Continue
    }

    /// Apply an adapter action under a deadline. Failures are logged only.
    async fn cycle_adapter(&self, action: AdapterAction) {
        let deadline = self.config.adapter_timeout;
        let call = self.adapter_controller.apply(action, &self.adapter);
        let result = match timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(AdapterError::Timeout(deadline.as_millis() as u64)),
        };

        match result {
            Ok(()) => {
                info!(adapter = %self.adapter, action = %action, "Adapter action applied");
                self.log(format!(
                    "{} the network adapter: {}",
                    action.past_tense(),
                    self.adapter
                ));
            }
            Err(e) => {
                warn!(adapter = %self.adapter, action = %action, error = %e, "Adapter action failed");
                self.log(format!("Failed to {} adapter: {} ({})", action, self.adapter, e));
            }
        }
    }

    fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(event = %message, "Watchdog event");
        self.events.log_event(message, self.time_provider.now());
    }

    fn set_state(&mut self, state: WatchdogState) {
        if self.session.state != state {
            debug!(from = %self.session.state, to = %state, "Watchdog state transition");
            self.session.state = state;
        }
        self.publish();
    }

    fn publish(&self) {
        let session = &self.session;
        let outage_secs = session
            .outage
            .is_open()
            .then(|| session.outage.elapsed(Instant::now()).as_secs());
        self.status_tx.send_replace(WatchdogSnapshot {
            state: session.state,
            connectivity: session.connectivity,
            adapter: Some(self.adapter.to_string()),
            outage_secs,
            recovery_cycles: session.recovery_cycles,
            alerts_raised: session.alerts_raised,
            unresolved: session.unresolved,
            last_probe: session.last_probe.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::adapter_controller::mocks::RecordingAdapterController;
    use crate::port::connectivity_probe::mocks::{ProbeOutcome, ScriptedProbe};
    use crate::port::event_sink::mocks::RecordingEventSink;
    use crate::port::time_provider::SystemTimeProvider;
    use tokio::task::JoinHandle;

    struct Harness {
        probe: Arc<ScriptedProbe>,
        adapter: Arc<RecordingAdapterController>,
        sink: Arc<RecordingEventSink>,
        status: watch::Receiver<WatchdogSnapshot>,
        stop: ShutdownSender,
        handle: JoinHandle<()>,
        start: Instant,
    }

    impl Harness {
        fn spawn(
            probe: ScriptedProbe,
            adapter: RecordingAdapterController,
            config: WatchdogConfig,
        ) -> Self {
            let probe = Arc::new(probe);
            let adapter = Arc::new(adapter);
            let sink = Arc::new(RecordingEventSink::new());
            let controller = WatchdogController::new(
                AdapterHandle::new("eth0").unwrap(),
                config,
                probe.clone(),
                adapter.clone(),
                sink.clone(),
                Arc::new(SystemTimeProvider),
            );
            let status = controller.subscribe();
            let (stop, token) = shutdown_channel();
            let start = Instant::now();
            let handle = tokio::spawn(controller.run(token));
            Self {
                probe,
                adapter,
                sink,
                status,
                stop,
                handle,
                start,
            }
        }

        /// Sleep until `secs` after session start
        async fn advance_to(&self, secs: f64) {
            tokio::time::sleep_until(self.start + Duration::from_secs_f64(secs)).await;
        }

        fn offsets(&self, instants: Vec<Instant>) -> Vec<u64> {
            instants
                .into_iter()
                .map(|at| (at - self.start).as_secs())
                .collect()
        }

        fn adapter_offsets(&self, action: AdapterAction) -> Vec<u64> {
            self.offsets(
                self.adapter
                    .calls()
                    .into_iter()
                    .filter(|c| c.action == action)
                    .map(|c| c.at)
                    .collect(),
            )
        }

        async fn stop(self) {
            self.stop.shutdown();
            self.handle.await.unwrap();
        }
    }

    fn transitions(sink: &RecordingEventSink) -> Vec<String> {
        sink.messages()
            .into_iter()
            .filter(|m| m == MSG_ONLINE || m == MSG_OFFLINE)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_outage_full_timeline() {
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(14.5).await;
        assert!(h.adapter.calls().is_empty(), "no action before threshold");
        assert_eq!(h.status.borrow().state, WatchdogState::Degrading);

        h.advance_to(35.5).await;
        assert_eq!(h.adapter_offsets(AdapterAction::Disable), vec![15]);
        assert_eq!(h.adapter_offsets(AdapterAction::Enable), vec![20]);

        let probes = h.offsets(h.probe.call_times());
        assert_eq!(probes.len(), 19);
        assert_eq!(&probes[16..], &[25, 30, 35]);

        let alerts = h.sink.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, ALERT_TITLE);
        assert_eq!(alerts[0].message, ALERT_MESSAGE);
        assert_eq!(h.sink.count_message(MSG_RECOVERY_FAILED), 1);
        assert_eq!(h.sink.count_message(MSG_OFFLINE), 1);

        let snapshot = h.status.borrow().clone();
        assert_eq!(snapshot.state, WatchdogState::AlertRaised);
        assert!(snapshot.unresolved);
        assert_eq!(snapshot.alerts_raised, 1);
        assert_eq!(snapshot.recovery_cycles, 1);

        // Next failed poll is plain degradation, still flagged unresolved
        h.advance_to(36.5).await;
        let snapshot = h.status.borrow().clone();
        assert_eq!(snapshot.state, WatchdogState::Degrading);
        assert!(snapshot.unresolved);
        assert_eq!(snapshot.alerts_raised, 1);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_outage_takes_no_action() {
        let h = Harness::spawn(
            ScriptedProbe::from_pattern(&[false, false, true], true),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(20.5).await;
        assert!(h.adapter.calls().is_empty());
        assert_eq!(transitions(&h.sink), vec![MSG_OFFLINE, MSG_ONLINE]);
        let snapshot = h.status.borrow().clone();
        assert_eq!(snapshot.state, WatchdogState::Monitoring);
        assert_eq!(snapshot.outage_secs, None);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_results_log_once() {
        let pattern = [
            true, true, false, false, false, true, true, false, true, true,
        ];
        let h = Harness::spawn(
            ScriptedProbe::from_pattern(&pattern, true),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(12.5).await;
        assert_eq!(
            transitions(&h.sink),
            vec![MSG_OFFLINE, MSG_ONLINE, MSG_OFFLINE, MSG_ONLINE]
        );

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_second_retry_restores_monitoring() {
        // t=0..15 offline, retry at t=25 fails, t=30 succeeds
        let mut pattern = vec![false; 16];
        pattern.extend([false, true]);
        let h = Harness::spawn(
            ScriptedProbe::from_pattern(&pattern, true),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(40.5).await;
        assert_eq!(h.sink.count_message(MSG_RESTORED), 1);
        assert!(h.sink.alerts().is_empty());
        assert_eq!(h.adapter.count(AdapterAction::Disable), 1);

        let probes = h.offsets(h.probe.call_times());
        assert_eq!(&probes[16..18], &[25, 30]);
        // Ordinary polling resumes one interval later
        assert_eq!(probes[18], 31);

        let snapshot = h.status.borrow().clone();
        assert_eq!(snapshot.state, WatchdogState::Monitoring);
        assert_eq!(snapshot.connectivity, ConnectivityState::Online);
        assert!(!snapshot.unresolved);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_accumulating_recycles_on_next_tick() {
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(36.5).await;
        assert_eq!(h.adapter_offsets(AdapterAction::Disable), vec![15, 36]);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_grace_period_waits_full_threshold() {
        let config = WatchdogConfig {
            post_exhaustion: PostExhaustionPolicy::RestartGracePeriod,
            ..Default::default()
        };
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_success(),
            config,
        );

        h.advance_to(49.5).await;
        assert_eq!(h.adapter_offsets(AdapterAction::Disable), vec![15]);

        h.advance_to(50.5).await;
        assert_eq!(h.adapter_offsets(AdapterAction::Disable), vec![15, 50]);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_alert_per_exhausted_cycle() {
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        // Second cycle: disable 36, enable 41, retries 46/51/56
        h.advance_to(56.5).await;
        assert_eq!(h.sink.alerts().len(), 2);
        assert_eq!(h.status.borrow().recovery_cycles, 2);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_adapter_failure_does_not_abort_recovery() {
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_fail("Access denied"),
            WatchdogConfig::default(),
        );

        h.advance_to(35.5).await;
        let messages = h.sink.messages();
        assert!(messages
            .iter()
            .any(|m| m.starts_with("Failed to disable adapter: eth0")));
        assert!(messages
            .iter()
            .any(|m| m.starts_with("Failed to enable adapter: eth0")));
        assert_eq!(h.probe.call_count(), 19);
        assert_eq!(h.sink.alerts().len(), 1);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_adapter_call_is_bounded() {
        use crate::port::adapter_controller::mocks::MockBehavior;

        let config = WatchdogConfig {
            adapter_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new(MockBehavior::Hang(Duration::from_secs(600))),
            config,
        );

        // disable 15 (times out 17), settle to 22, enable times out 24,
        // retries 29/34/39
        h.advance_to(39.5).await;
        let timeouts = h
            .sink
            .messages()
            .into_iter()
            .filter(|m| m.contains("timed out"))
            .count();
        assert_eq!(timeouts, 2);
        assert_eq!(h.adapter_offsets(AdapterAction::Enable), vec![22]);
        assert_eq!(h.sink.alerts().len(), 1);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_counts_as_offline() {
        let h = Harness::spawn(
            ScriptedProbe::new(
                [ProbeOutcome::Error("socket permission denied".to_string())],
                ProbeOutcome::Reachable,
            ),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(2.5).await;
        let messages = h.sink.messages();
        assert_eq!(
            messages[0],
            "An error occurred while pinging: IO error: socket permission denied"
        );
        assert_eq!(transitions(&h.sink), vec![MSG_OFFLINE, MSG_ONLINE]);

        h.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_observed_within_poll_interval() {
        let h = Harness::spawn(
            ScriptedProbe::always(true),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(3.5).await;
        let probe = h.probe.clone();
        let status = h.status.clone();
        let start = h.start;
        h.stop().await;

        assert!(Instant::now() - start < Duration::from_secs(4));
        assert_eq!(probe.call_count(), 4);
        assert_eq!(status.borrow().state, WatchdogState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_retry_loop() {
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(27.0).await;
        let probe = h.probe.clone();
        let sink = h.sink.clone();
        h.stop().await;

        // 0..=15 plus the retry at 25
        assert_eq!(probe.call_count(), 17);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.call_count(), 17);
        assert!(sink.alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_settle_reenables_adapter() {
        let h = Harness::spawn(
            ScriptedProbe::always(false),
            RecordingAdapterController::new_success(),
            WatchdogConfig::default(),
        );

        h.advance_to(17.0).await;
        let adapter = h.adapter.clone();
        h.stop().await;

        assert_eq!(
            adapter.actions(),
            vec![AdapterAction::Disable, AdapterAction::Enable]
        );
    }
}
