// Monitor Events - the user-facing log stream and alert channel

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// `DD/MM/YY - HH:MM`
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%m/%y - %H:%M";

/// Render a log line as `[DD/MM/YY - HH:MM] - <message>` in the zone of `timestamp`
pub fn format_log_line<Tz>(timestamp: &DateTime<Tz>, message: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] - {}", timestamp.format(LOG_TIMESTAMP_FORMAT), message)
}

/// One timestamped entry of the log stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogLine {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogLine {
    /// Rendered in local time, the way a user reads it
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let local = self.timestamp.with_timezone(&Local);
        f.write_str(&format_log_line(&local, &self.message))
    }
}

/// User-visible alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Everything the watchdog reports to presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorEvent {
    Log(LogLine),
    Alert(Alert),
}
