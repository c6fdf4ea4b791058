// Event Sink Port - log stream and alert channel
use chrono::{DateTime, Utc};

/// Receiver of watchdog log lines and user alerts.
///
/// Called from the watchdog worker; implementations must return quickly and
/// hand any blocking I/O (files, notifications) to another task.
pub trait EventSink: Send + Sync {
    fn log_event(&self, message: &str, timestamp: DateTime<Utc>);

    fn raise_alert(&self, title: &str, message: &str);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Alert, LogLine, MonitorEvent};
    use std::sync::Mutex;

    /// Mock sink keeping every event in memory
    #[derive(Default)]
    pub struct RecordingEventSink {
        events: Mutex<Vec<MonitorEvent>>,
    }

    impl RecordingEventSink {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn events(&self) -> Vec<MonitorEvent> {
            self.events.lock().unwrap().clone()
        }
        /// Log messages in order, without timestamps
        pub fn messages(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    MonitorEvent::Log(line) => Some(line.message),
                    MonitorEvent::Alert(_) => None,
                })
                .collect()
        }
        pub fn alerts(&self) -> Vec<Alert> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    MonitorEvent::Alert(alert) => Some(alert),
                    MonitorEvent::Log(_) => None,
                })
                .collect()
        }
        pub fn count_message(&self, message: &str) -> usize {
            self.messages().iter().filter(|m| m.as_str() == message).count()
        }
    }

    impl EventSink for RecordingEventSink {
        fn log_event(&self, message: &str, timestamp: DateTime<Utc>) {
            self.events
                .lock()
                .unwrap()
                .push(MonitorEvent::Log(LogLine::new(timestamp, message)));
        }
        fn raise_alert(&self, title: &str, message: &str) {
            self.events.lock().unwrap().push(MonitorEvent::Alert(Alert {
                title: title.to_string(),
                message: message.to_string(),
                raised_at: Utc::now(),
            }));
        }
    }
}
