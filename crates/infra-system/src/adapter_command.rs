// Command-based adapter controller
// reason: tokio::process + timeout so a stuck OS tool cannot stall the watchdog
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use netguard_core::application::watchdog::constants::ADAPTER_COMMAND_TIMEOUT;
use netguard_core::domain::AdapterHandle;
use netguard_core::port::{AdapterAction, AdapterController, AdapterError};

/// Placeholder replaced by the adapter name in template arguments
pub const ADAPTER_PLACEHOLDER: &str = "{adapter}";

/// Program plus argument list; `{adapter}` in any argument is substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a whitespace-separated command line (no quoting support)
    ///
    /// # Example
    /// ```ignore
    /// let t = CommandTemplate::parse("nmcli device connect {adapter}")?;
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    fn render(&self, adapter: &AdapterHandle) -> (String, Vec<String>) {
        let args = self
            .args
            .iter()
            .map(|a| a.replace(ADAPTER_PLACEHOLDER, adapter.as_str()))
            .collect();
        (self.program.clone(), args)
    }
}

/// Built-in command for the current platform, if there is one
fn platform_command(action: AdapterAction) -> Option<CommandTemplate> {
    #[cfg(target_os = "linux")]
    {
        let state = match action {
            AdapterAction::Enable => "up",
            AdapterAction::Disable => "down",
        };
        Some(CommandTemplate::new(
            "ip",
            ["link", "set", "dev", ADAPTER_PLACEHOLDER, state],
        ))
    }

    #[cfg(target_os = "macos")]
    {
        let state = match action {
            AdapterAction::Enable => "up",
            AdapterAction::Disable => "down",
        };
        Some(CommandTemplate::new("ifconfig", [ADAPTER_PLACEHOLDER, state]))
    }

    #[cfg(windows)]
    {
        let verb = match action {
            AdapterAction::Enable => "Enable",
            AdapterAction::Disable => "Disable",
        };
        Some(CommandTemplate::new(
            "PowerShell",
            vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!(
                    "{}-NetAdapter -Name '{}' -Confirm:$false",
                    verb, ADAPTER_PLACEHOLDER
                ),
            ],
        ))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
    {
        let _ = action;
        None
    }
}

/// Enables/disables an interface by running an OS command.
///
/// Both platform defaults are idempotent: bringing an interface to the state
/// it is already in exits successfully.
pub struct CommandAdapterController {
    enable: Option<CommandTemplate>,
    disable: Option<CommandTemplate>,
    command_timeout: Duration,
}

impl CommandAdapterController {
    /// Platform default commands
    pub fn new() -> Self {
        Self {
            enable: platform_command(AdapterAction::Enable),
            disable: platform_command(AdapterAction::Disable),
            command_timeout: ADAPTER_COMMAND_TIMEOUT,
        }
    }

    /// Custom commands (e.g. nmcli, netsh)
    pub fn with_commands(enable: CommandTemplate, disable: CommandTemplate) -> Self {
        Self {
            enable: Some(enable),
            disable: Some(disable),
            command_timeout: ADAPTER_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    fn template(&self, action: AdapterAction) -> Option<&CommandTemplate> {
        match action {
            AdapterAction::Enable => self.enable.as_ref(),
            AdapterAction::Disable => self.disable.as_ref(),
        }
    }

    async fn execute(&self, action: AdapterAction, adapter: &AdapterHandle) -> Result<(), AdapterError> {
        let template = self.template(action).ok_or_else(|| {
            AdapterError::Unsupported(format!("no {} command for this platform", action))
        })?;
        let (program, args) = template.render(adapter);

        info!(
            adapter = %adapter,
            action = %action,
            program = %program,
            args = ?args,
            "Executing adapter command"
        );

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AdapterError::SpawnFailed(format!("{}: {}", program, e)))?;

        let output = match timeout(self.command_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(AdapterError::SpawnFailed(e.to_string())),
            Err(_) => {
                warn!(adapter = %adapter, action = %action, "Adapter command timed out");
                return Err(AdapterError::Timeout(self.command_timeout.as_millis() as u64));
            }
        };

        if output.status.success() {
            info!(adapter = %adapter, action = %action, "Adapter command succeeded");
            return Ok(());
        }

        Err(AdapterError::CommandFailed {
            action,
            adapter: adapter.to_string(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Default for CommandAdapterController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdapterController for CommandAdapterController {
    async fn enable(&self, adapter: &AdapterHandle) -> Result<(), AdapterError> {
        self.execute(AdapterAction::Enable, adapter).await
    }

    async fn disable(&self, adapter: &AdapterHandle) -> Result<(), AdapterError> {
        self.execute(AdapterAction::Disable, adapter).await
    }
}
