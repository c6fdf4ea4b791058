// Event dispatch - fans watchdog events out to console, history and notifier
// reason: the EventSink port must not block, so events cross an mpsc channel
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use netguard_core::domain::{Alert, LogLine, MonitorEvent};
use netguard_core::port::EventSink;

use crate::notifier::Notifier;

/// Default number of log lines kept for `logs.tail`
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Create a sink/receiver pair
pub fn event_channel() -> (ChannelEventSink, mpsc::UnboundedReceiver<MonitorEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelEventSink { tx }, rx)
}

/// `EventSink` that only enqueues; never blocks the watchdog
#[derive(Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl ChannelEventSink {
    fn send(&self, event: MonitorEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event dispatcher gone, dropping event");
        }
    }
}

impl EventSink for ChannelEventSink {
    fn log_event(&self, message: &str, timestamp: DateTime<Utc>) {
        self.send(MonitorEvent::Log(LogLine::new(timestamp, message)));
    }

    fn raise_alert(&self, title: &str, message: &str) {
        self.send(MonitorEvent::Alert(Alert {
            title: title.to_string(),
            message: message.to_string(),
            raised_at: Utc::now(),
        }));
    }
}

#[derive(Debug, Default)]
struct HistoryInner {
    lines: VecDeque<LogLine>,
    alerts: u64,
}

/// Bounded ring buffer of recent log lines
#[derive(Debug, Clone)]
pub struct LogHistory {
    capacity: usize,
    inner: Arc<Mutex<HistoryInner>>,
}

impl LogHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Arc::new(Mutex::new(HistoryInner::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HistoryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, line: LogLine) {
        let mut inner = self.lock();
        if inner.lines.len() == self.capacity {
            inner.lines.pop_front();
        }
        inner.lines.push_back(line);
    }

    fn record_alert(&self) {
        self.lock().alerts += 1;
    }

    /// Last `n` lines, oldest first, rendered `[DD/MM/YY - HH:MM] - msg`
    pub fn tail(&self, n: usize) -> Vec<String> {
        let inner = self.lock();
        let skip = inner.lines.len().saturating_sub(n);
        inner.lines.iter().skip(skip).map(|l| l.to_string()).collect()
    }

    /// Raw messages, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lock().lines.iter().map(|l| l.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alerts(&self) -> u64 {
        self.lock().alerts
    }
}

impl Default for LogHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Drains the event channel until every sink handle is dropped
pub struct EventDispatcher {
    rx: mpsc::UnboundedReceiver<MonitorEvent>,
    history: LogHistory,
    notifier: Arc<dyn Notifier>,
    echo_stdout: bool,
}

impl EventDispatcher {
    pub fn new(
        rx: mpsc::UnboundedReceiver<MonitorEvent>,
        history: LogHistory,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            rx,
            history,
            notifier,
            echo_stdout: false,
        }
    }

    /// Also print each line to stdout (interactive daemon)
    pub fn with_stdout(mut self, echo: bool) -> Self {
        self.echo_stdout = echo;
        self
    }

    pub async fn run(mut self) {
        info!("Event dispatcher started");

        while let Some(event) = self.rx.recv().await {
            match event {
                MonitorEvent::Log(line) => {
                    info!(event_time = %line.timestamp, "{}", line.message);
                    if self.echo_stdout {
                        println!("{}", line);
                    }
                    self.history.push(line);
                }
                MonitorEvent::Alert(alert) => {
                    warn!(title = %alert.title, "{}", alert.message);
                    self.history.record_alert();
                    // Delivery may block on a desktop session; keep draining meanwhile
                    let notifier = Arc::clone(&self.notifier);
                    tokio::spawn(async move {
                        notifier.notify(&alert).await;
                    });
                }
            }
        }

        info!("Event dispatcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    #[derive(Default)]
    struct CountingNotifier {
        seen: Mutex<Vec<Alert>>,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self, alert: &Alert) {
            self.seen.lock().unwrap().push(alert.clone());
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let history = LogHistory::new(3);
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        for i in 0..5 {
            history.push(LogLine::new(ts, format!("line {}", i)));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.messages(), vec!["line 2", "line 3", "line 4"]);

        let tail = history.tail(2);
        assert_eq!(tail.len(), 2);
        assert!(tail[0].ends_with("] - line 3"));
        assert!(tail[1].ends_with("] - line 4"));
        assert_eq!(history.tail(10).len(), 3);
    }

    #[tokio::test]
    async fn test_dispatcher_routes_events() {
        let (sink, rx) = event_channel();
        let history = LogHistory::new(10);
        let notifier = Arc::new(CountingNotifier::default());
        let dispatcher = EventDispatcher::new(rx, history.clone(), notifier.clone());
        let handle = tokio::spawn(dispatcher.run());

        sink.log_event("Network is offline.", Utc::now());
        sink.raise_alert("Network Issue", "Unable to restore connection after adapter restart.");
        sink.log_event("Network is online.", Utc::now());
        drop(sink);

        handle.await.unwrap();
        // Notification tasks are detached; give them a turn
        for _ in 0..10 {
            if !notifier.seen.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(history.messages(), vec!["Network is offline.", "Network is online."]);
        assert_eq!(history.alerts(), 1);
        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "Network Issue");
    }

    #[test]
    fn test_sink_survives_closed_channel() {
        let (sink, rx) = event_channel();
        drop(rx);
        sink.log_event("Network is offline.", Utc::now());
        sink.raise_alert("Network Issue", "gone");
    }
}
