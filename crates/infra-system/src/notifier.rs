//! User alert delivery
//!
//! - Desktop notifications (notify-send, osascript, PowerShell message box)
//! - Log-only fallback for headless hosts
//!
//! Delivery failures are logged and never reach the watchdog.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use netguard_core::domain::Alert;

/// Upper bound for one notification command
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

const APP_NAME: &str = "NetGuard";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert);
}

/// Writes alerts to the tracing log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn notify(&self, alert: &Alert) {
        warn!(title = %alert.title, raised_at = %alert.raised_at, "ALERT: {}", alert.message);
    }
}

/// Shows alerts as desktop notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }

    fn command(alert: &Alert) -> (String, Vec<String>) {
        #[cfg(target_os = "macos")]
        {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_quotes(&alert.message),
                escape_quotes(&alert.title)
            );
            ("osascript".to_string(), vec!["-e".to_string(), script])
        }

        #[cfg(windows)]
        {
            let script = format!(
                "Add-Type -AssemblyName PresentationFramework; [System.Windows.MessageBox]::Show('{}', '{}')",
                alert.message.replace('\'', "''"),
                alert.title.replace('\'', "''")
            );
            (
                "PowerShell".to_string(),
                vec!["-NoProfile".to_string(), "-Command".to_string(), script],
            )
        }

        #[cfg(not(any(target_os = "macos", windows)))]
        {
            (
                "notify-send".to_string(),
                vec![
                    "--urgency".to_string(),
                    "critical".to_string(),
                    "--app-name".to_string(),
                    APP_NAME.to_string(),
                    alert.title.clone(),
                    alert.message.clone(),
                ],
            )
        }
    }
}

#[cfg(target_os = "macos")]
fn escape_quotes(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, alert: &Alert) {
        // Always keep a record, even when no desktop is available
        LogOnlyNotifier.notify(alert).await;

        let (program, args) = Self::command(alert);
        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program, "Error sending desktop notification: {}", e);
                return;
            }
        };

        match timeout(NOTIFY_TIMEOUT, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                info!(app = APP_NAME, title = %alert.title, "Desktop notification sent");
            }
            Ok(Ok(output)) => {
                warn!(
                    program = %program,
                    exit_code = ?output.status.code(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "Failed to send desktop notification"
                );
            }
            Ok(Err(e)) => warn!(program = %program, "Error sending desktop notification: {}", e),
            Err(_) => warn!(program = %program, "Desktop notification timed out"),
        }
    }
}
