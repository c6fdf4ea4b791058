//! NetGuard Daemon - Main Entry Point
//! Connectivity watchdog + JSON-RPC control server

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::{AdapterSelection, DaemonConfig, LogFormat, NotifyKind, ProbeKind};
use netguard_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use netguard_core::application::MonitorService;
use netguard_core::port::id_provider::UuidProvider;
use netguard_core::port::time_provider::SystemTimeProvider;
use netguard_core::port::{AdapterController, ConnectivityProbe};
use netguard_infra_system::{
    event_channel, has_adapter_privileges, AdapterInventory, CommandAdapterController,
    DesktopNotifier, EventDispatcher, LogHistory, LogOnlyNotifier, Notifier, PingProbe,
    TcpConnectProbe,
};
use telemetry::TelemetryStatus;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long shutdown waits for queued events to drain
const DISPATCH_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging(format: LogFormat) -> Result<TelemetryStatus> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("netguard=info"))
        .context("Failed to create env filter")?;

    let (otel, status) = telemetry::telemetry_layer()?;
    let registry = tracing_subscriber::registry().with(otel).with(env_filter);

    match format {
        // Production: JSON structured logging
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
    Ok(status)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (fail fast, before anything starts)
    let config = DaemonConfig::from_env().context("Failed to load configuration")?;

    // 2. Initialize logging
    let telemetry_status = init_logging(config.log_format)?;
    info!("NetGuard daemon v{} starting...", VERSION);
    match telemetry_status {
        TelemetryStatus::Enabled { endpoint } => {
            info!(endpoint = %endpoint, "OpenTelemetry initialized")
        }
        TelemetryStatus::FeatureDisabled => {
            warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled")
        }
        TelemetryStatus::NotConfigured => {}
    }

    if !has_adapter_privileges() {
        warn!("Not running with administrator privileges; adapter restarts will likely fail");
    }

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let probe: Arc<dyn ConnectivityProbe> = match config.probe {
        ProbeKind::Icmp => Arc::new(PingProbe::new(time_provider.clone())),
        ProbeKind::Tcp => Arc::new(TcpConnectProbe::new(config.tcp_port, time_provider.clone())),
    };

    let adapter_controller: Arc<dyn AdapterController> = match &config.adapter_commands {
        Some((enable, disable)) => Arc::new(
            CommandAdapterController::with_commands(enable.clone(), disable.clone())
                .with_timeout(config.watchdog.adapter_timeout),
        ),
        None => Arc::new(
            CommandAdapterController::new().with_timeout(config.watchdog.adapter_timeout),
        ),
    };

    let notifier: Arc<dyn Notifier> = match config.notify {
        NotifyKind::Desktop => Arc::new(DesktopNotifier::new()),
        NotifyKind::Log => Arc::new(LogOnlyNotifier),
    };

    // 4. Event pipeline: watchdog -> channel -> console/history/notifier
    let history = LogHistory::new(config.log_history);
    let (sink, events_rx) = event_channel();
    let dispatcher =
        EventDispatcher::new(events_rx, history.clone(), notifier).with_stdout(true);
    let dispatcher_handle = tokio::spawn(dispatcher.run());

    let monitor = Arc::new(MonitorService::new(
        config.watchdog.clone(),
        probe,
        adapter_controller,
        Arc::new(sink),
        time_provider,
        id_provider,
    ));
    let inventory = Arc::new(AdapterInventory::new());

    // 5. Auto-start monitoring if an adapter was configured
    if let Some(selection) = &config.adapter {
        let adapter = match selection {
            AdapterSelection::Named(name) => Some(name.clone()),
            AdapterSelection::Auto => {
                let picked = inventory.default_adapter().map(|a| a.name);
                if picked.is_none() {
                    warn!("NETGUARD_ADAPTER=auto but no usable network adapter was found");
                }
                picked
            }
        };
        if let Some(adapter) = adapter {
            monitor
                .start(&adapter)
                .await
                .with_context(|| format!("Failed to start monitoring on {}", adapter))?;
        }
    }

    // 6. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_server = RpcServer::new(
        RpcServerConfig::with_port(config.rpc_port),
        RpcHandler::new(monitor.clone(), history, inventory),
    );
    let (rpc_addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(rpc = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown: monitoring first so the adapter is never left down
    if let Err(e) = monitor.stop().await {
        error!(error = %e, "Failed to stop monitoring");
    }
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    // The event channel closes once the last MonitorService handle is gone
    drop(monitor);
    if tokio::time::timeout(DISPATCH_DRAIN_TIMEOUT, dispatcher_handle)
        .await
        .is_err()
    {
        warn!("Event dispatcher did not drain in time");
    }

    info!("Shutdown complete.");

    Ok(())
}
