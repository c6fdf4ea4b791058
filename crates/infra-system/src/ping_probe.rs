// ICMP echo probe via the platform ping binary
// reason: tokio::process keeps the probe off the runtime's worker threads
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use netguard_core::domain::ProbeResult;
use netguard_core::port::{ConnectivityProbe, ProbeError, TimeProvider};

const DEFAULT_PING_PROGRAM: &str = "ping";

/// Extra time granted to the ping process beyond its own reply deadline
const PROCESS_GRACE: Duration = Duration::from_millis(500);

/// Ping probe: one echo request per call
pub struct PingProbe {
    program: String,
    time_provider: Arc<dyn TimeProvider>,
}

impl PingProbe {
    /// Create a probe using `ping` from PATH
    ///
    /// # Example
    /// ```ignore
    /// let probe = PingProbe::new(Arc::new(SystemTimeProvider));
    /// let result = probe.probe("1.1.1.1", Duration::from_secs(2)).await?;
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::with_program(DEFAULT_PING_PROGRAM, time_provider)
    }

    /// Use a specific ping binary
    pub fn with_program(program: impl Into<String>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            program: program.into(),
            time_provider,
        }
    }

    /// Platform-specific arguments for a single echo request
    fn build_args(target: &str, reply_timeout: Duration) -> Vec<String> {
        #[cfg(windows)]
        {
            vec![
                "-n".to_string(),
                "1".to_string(),
                "-w".to_string(),
                reply_timeout.as_millis().max(1).to_string(),
                target.to_string(),
            ]
        }

        #[cfg(target_os = "macos")]
        {
            // macOS -W takes milliseconds
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-W".to_string(),
                reply_timeout.as_millis().max(1).to_string(),
                target.to_string(),
            ]
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // iputils -W takes whole seconds
            let secs = reply_timeout.as_secs_f64().ceil().max(1.0) as u64;
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-W".to_string(),
                secs.to_string(),
                target.to_string(),
            ]
        }
    }

    /// Whether the ping output reports an echo reply
    fn reply_received(success: bool, stdout: &str) -> bool {
        // Windows ping exits 0 on "Destination host unreachable"
        if cfg!(windows) {
            success && stdout.contains("TTL=")
        } else {
            success
        }
    }

    async fn run(&self, target: &str, reply_timeout: Duration) -> Result<ProbeResult, ProbeError> {
        let args = Self::build_args(target, reply_timeout);
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    ProbeError::ToolUnavailable(format!("{}: {}", self.program, e))
                }
                _ => ProbeError::Io(e.to_string()),
            })?;

        match timeout(reply_timeout + PROCESS_GRACE, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let now = self.time_provider.now();
                if Self::reply_received(output.status.success(), &stdout) {
                    Ok(ProbeResult::success(now, parse_latency(&stdout)))
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Ok(ProbeResult::failure(
                        now,
                        failure_detail(output.status.code(), &stdout, &stderr),
                    ))
                }
            }
            Ok(Err(e)) => Err(ProbeError::Io(e.to_string())),
            Err(_) => Ok(ProbeResult::failure(
                self.time_provider.now(),
                format!("Request timed out after {}ms", reply_timeout.as_millis()),
            )),
        }
    }
}

/// Reject targets that are empty or could be read as ping options
fn validate_target(target: &str) -> Result<(), ProbeError> {
    let trimmed = target.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.contains(char::is_whitespace) {
        return Err(ProbeError::InvalidTarget(target.to_string()));
    }
    Ok(())
}

/// Parse the round-trip time from `time=12.3 ms` / `time<1ms`
fn parse_latency(stdout: &str) -> Option<Duration> {
    stdout.lines().find_map(|line| {
        let start = line
            .find("time=")
            .or_else(|| line.find("time<"))
            .map(|i| i + 5)?;
        let number: String = line[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let ms: f64 = number.parse().ok()?;
        Some(Duration::from_micros((ms * 1000.0).round() as u64))
    })
}

/// Last meaningful line of the ping output, for the probe error detail
fn failure_detail(code: Option<i32>, stdout: &str, stderr: &str) -> String {
    let line = stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last();
    match line {
        Some(line) => format!("ping exited with {:?}: {}", code, line),
        None => format!("ping exited with {:?}", code),
    }
}

#[async_trait]
impl ConnectivityProbe for PingProbe {
    async fn probe(&self, target: &str, timeout: Duration) -> Result<ProbeResult, ProbeError> {
        validate_target(target)?;
        let result = self.run(target.trim(), timeout).await?;
        debug!(
            target_host = %target,
            reachable = result.reachable,
            latency_ms = ?result.latency_ms(),
            "Ping probe completed"
        );
        Ok(result)
    }
}
