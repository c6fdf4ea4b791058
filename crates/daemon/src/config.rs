//! Daemon configuration from `NETGUARD_*` environment variables
//!
//! Parsed once at start; invalid values abort startup with context.

use anyhow::{bail, Context, Result};
use netguard_api_rpc::server::DEFAULT_RPC_PORT;
use netguard_core::application::{PostExhaustionPolicy, WatchdogConfig};
use netguard_infra_system::event_dispatch::DEFAULT_HISTORY_CAPACITY;
use netguard_infra_system::tcp_probe::DEFAULT_TCP_PORT;
use netguard_infra_system::CommandTemplate;
use std::str::FromStr;
use std::time::Duration;

/// Adapter picked by the inventory when `NETGUARD_ADAPTER=auto`
const AUTO_ADAPTER: &str = "auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterSelection {
    Named(String),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Icmp,
    Tcp,
}

impl FromStr for ProbeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icmp" | "ping" => Ok(Self::Icmp),
            "tcp" => Ok(Self::Tcp),
            other => bail!("unknown probe '{}' (expected icmp|tcp)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Desktop,
    Log,
}

impl FromStr for NotifyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "log" | "none" => Ok(Self::Log),
            other => bail!("unknown notifier '{}' (expected desktop|log)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format '{}' (expected pretty|json)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Auto-start monitoring on this adapter
    pub adapter: Option<AdapterSelection>,
    pub watchdog: WatchdogConfig,
    pub probe: ProbeKind,
    pub tcp_port: u16,
    /// Custom enable/disable commands; platform defaults when unset
    pub adapter_commands: Option<(CommandTemplate, CommandTemplate)>,
    pub notify: NotifyKind,
    pub rpc_port: u16,
    pub log_format: LogFormat,
    pub log_history: usize,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let adapter = get("NETGUARD_ADAPTER").map(|name| {
            if name.eq_ignore_ascii_case(AUTO_ADAPTER) {
                AdapterSelection::Auto
            } else {
                AdapterSelection::Named(name)
            }
        });

        let mut watchdog = WatchdogConfig::default();
        if let Some(target) = get("NETGUARD_TARGET") {
            watchdog.target = target;
        }
        if let Some(ms) = get("NETGUARD_POLL_INTERVAL_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("NETGUARD_POLL_INTERVAL_MS: invalid number '{}'", ms))?;
            watchdog.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = get("NETGUARD_OUTAGE_THRESHOLD_SECS") {
            let secs: u64 = secs.parse().with_context(|| {
                format!("NETGUARD_OUTAGE_THRESHOLD_SECS: invalid number '{}'", secs)
            })?;
            watchdog.outage_threshold = Duration::from_secs(secs);
        }
        if let Some(policy) = get("NETGUARD_POST_EXHAUSTION") {
            watchdog.post_exhaustion =
                PostExhaustionPolicy::from_str(&policy).context("NETGUARD_POST_EXHAUSTION")?;
        }
        watchdog.validate().context("Invalid watchdog configuration")?;

        let probe = match get("NETGUARD_PROBE") {
            Some(v) => v.parse().context("NETGUARD_PROBE")?,
            None => ProbeKind::Icmp,
        };
        let tcp_port = match get("NETGUARD_TCP_PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("NETGUARD_TCP_PORT: invalid port '{}'", v))?,
            None => DEFAULT_TCP_PORT,
        };

        let adapter_commands = match (
            get("NETGUARD_ENABLE_COMMAND"),
            get("NETGUARD_DISABLE_COMMAND"),
        ) {
            (Some(enable), Some(disable)) => Some((
                CommandTemplate::parse(&enable).context("NETGUARD_ENABLE_COMMAND")?,
                CommandTemplate::parse(&disable).context("NETGUARD_DISABLE_COMMAND")?,
            )),
            (None, None) => None,
            _ => bail!("NETGUARD_ENABLE_COMMAND and NETGUARD_DISABLE_COMMAND must be set together"),
        };

        let notify = match get("NETGUARD_NOTIFY") {
            Some(v) => v.parse().context("NETGUARD_NOTIFY")?,
            None => NotifyKind::Desktop,
        };
        let rpc_port = match get("NETGUARD_RPC_PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("NETGUARD_RPC_PORT: invalid port '{}'", v))?,
            None => DEFAULT_RPC_PORT,
        };
        let log_format = match get("NETGUARD_LOG_FORMAT") {
            Some(v) => v.parse().context("NETGUARD_LOG_FORMAT")?,
            None => LogFormat::Pretty,
        };
        let log_history = match get("NETGUARD_LOG_HISTORY") {
            Some(v) => v
                .parse()
                .with_context(|| format!("NETGUARD_LOG_HISTORY: invalid number '{}'", v))?,
            None => DEFAULT_HISTORY_CAPACITY,
        };
        if log_history == 0 {
            bail!("NETGUARD_LOG_HISTORY must be positive");
        }

        Ok(Self {
            adapter,
            watchdog,
            probe,
            tcp_port,
            adapter_commands,
            notify,
            rpc_port,
            log_format,
            log_history,
        })
    }
}
