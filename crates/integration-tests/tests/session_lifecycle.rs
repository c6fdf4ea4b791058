//! Session Lifecycle
//!
//! start/stop semantics of MonitorService with the real event pipeline.

mod common;

use common::Pipeline;
use netguard_core::application::watchdog::constants::*;
use netguard_core::application::{PostExhaustionPolicy, WatchdogConfig};
use netguard_core::error::AppError;
use netguard_core::port::adapter_controller::mocks::RecordingAdapterController;
use netguard_core::port::connectivity_probe::mocks::ScriptedProbe;
use netguard_core::port::AdapterAction;

#[tokio::test(start_paused = true)]
async fn test_start_without_adapter_spawns_nothing() {
    let p = Pipeline::new(
        ScriptedProbe::always(true),
        RecordingAdapterController::new_success(),
    );

    let err = p.monitor.start("").await.unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().contains("Please select a network adapter"));

    p.advance_to(5.0).await;
    assert_eq!(p.probe.call_count(), 0);
    assert!(!p.monitor.is_running().await);

    let history = p.shutdown().await;
    assert!(history.is_empty(), "rejected start leaves no session trace");
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_probing_within_one_interval() {
    let p = Pipeline::new(
        ScriptedProbe::always(false),
        RecordingAdapterController::new_success(),
    );
    p.monitor.start("eth0").await.unwrap();

    p.advance_to(10.5).await;
    assert!(p.monitor.stop().await.unwrap());
    let probes_at_stop = p.probe.call_count();
    assert_eq!(probes_at_stop, 11);

    p.advance_to(30.0).await;
    assert_eq!(p.probe.call_count(), probes_at_stop);
    assert!(p.adapter.calls().is_empty());
    assert!(!p.monitor.stop().await.unwrap(), "second stop is a no-op");

    let history = p.shutdown().await;
    assert_eq!(
        history
            .messages()
            .iter()
            .filter(|m| m.as_str() == MSG_MONITORING_STOPPED)
            .count(),
        1
    );
}

/// A restart begins with no outage timer: the next cycle needs a full 15s
#[tokio::test(start_paused = true)]
async fn test_restart_gets_fresh_outage_timer() {
    let p = Pipeline::new(
        ScriptedProbe::always(false),
        RecordingAdapterController::new_success(),
    );
    p.monitor.start("eth0").await.unwrap();
    p.advance_to(12.5).await;
    p.monitor.stop().await.unwrap();

    let second = p.monitor.start("eth0").await.unwrap();
    assert_eq!(second.session_id, "session-2");

    p.advance_to(13.0).await;
    let status = p.monitor.status().await;
    assert_eq!(status.watchdog.outage_secs, Some(0));
    assert_eq!(status.watchdog.recovery_cycles, 0);

    // Restarted at 12.5; first probe of the new session opens the window
    p.advance_to(27.0).await;
    assert!(p.adapter.calls().is_empty());
    p.advance_to(28.0).await;
    assert_eq!(p.adapter.count(AdapterAction::Disable), 1);

    // Both sessions reported going offline
    let history = p.shutdown().await;
    assert_eq!(
        history
            .messages()
            .iter()
            .filter(|m| m.as_str() == MSG_OFFLINE)
            .count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_settle_restores_adapter() {
    let p = Pipeline::new(
        ScriptedProbe::always(false),
        RecordingAdapterController::new_success(),
    );
    p.monitor.start("eth0").await.unwrap();

    p.advance_to(17.0).await;
    p.monitor.stop().await.unwrap();

    assert_eq!(
        p.adapter.actions(),
        vec![AdapterAction::Disable, AdapterAction::Enable]
    );
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_restart_grace_period_policy_end_to_end() {
    let config = WatchdogConfig {
        post_exhaustion: PostExhaustionPolicy::RestartGracePeriod,
        ..WatchdogConfig::default()
    };
    let p = Pipeline::with_config(
        ScriptedProbe::always(false),
        RecordingAdapterController::new_success(),
        config,
    );
    p.monitor.start("eth0").await.unwrap();

    p.advance_to(50.5).await;
    assert_eq!(p.adapter_offsets(AdapterAction::Disable), vec![15, 50]);
    assert_eq!(p.notifier.alerts().len(), 1);

    p.shutdown().await;
}
