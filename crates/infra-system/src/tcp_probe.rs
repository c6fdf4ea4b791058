// TCP connect probe - echo alternative where ICMP is filtered or unprivileged
use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use netguard_core::domain::ProbeResult;
use netguard_core::port::{ConnectivityProbe, ProbeError, TimeProvider};

/// DNS over TCP, open on the common public resolvers
pub const DEFAULT_TCP_PORT: u16 = 53;

/// Reachability by TCP handshake against `target:port`.
///
/// A refused connection still proves the host answered, so it counts as
/// reachable; only silence (timeout) or routing/DNS errors count as offline.
pub struct TcpConnectProbe {
    port: u16,
    time_provider: Arc<dyn TimeProvider>,
}

impl TcpConnectProbe {
    pub fn new(port: u16, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            port,
            time_provider,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host`, `host:port` or a bracketed IPv6 literal with port
    fn address(&self, target: &str) -> String {
        if target.parse::<SocketAddr>().is_ok() {
            return target.to_string();
        }
        if target.parse::<std::net::Ipv6Addr>().is_ok() {
            return format!("[{}]:{}", target, self.port);
        }
        format!("{}:{}", target, self.port)
    }
}

#[async_trait]
impl ConnectivityProbe for TcpConnectProbe {
    async fn probe(&self, target: &str, probe_timeout: Duration) -> Result<ProbeResult, ProbeError> {
        let target = target.trim();
        if target.is_empty() || target.contains(char::is_whitespace) {
            return Err(ProbeError::InvalidTarget(target.to_string()));
        }

        let address = self.address(target);
        let started = Instant::now();
        let outcome = timeout(probe_timeout, TcpStream::connect(address.as_str())).await;
        let now = self.time_provider.now();

        let result = match outcome {
            Ok(Ok(_stream)) => ProbeResult::success(now, Some(started.elapsed())),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                ProbeResult::success(now, Some(started.elapsed()))
            }
            Ok(Err(e)) => ProbeResult::failure(now, format!("{}: {}", address, e)),
            Err(_) => ProbeResult::failure(
                now,
                format!("{}: timed out after {}ms", address, probe_timeout.as_millis()),
            ),
        };

        debug!(
            address = %address,
            reachable = result.reachable,
            error = ?result.error,
            "TCP probe completed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_core::port::time_provider::SystemTimeProvider;
    use tokio::net::TcpListener;

    fn probe(port: u16) -> TcpConnectProbe {
        TcpConnectProbe::new(port, Arc::new(SystemTimeProvider))
    }

    #[tokio::test]
    async fn test_listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = probe(port)
            .probe("127.0.0.1", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(result.reachable);
        assert!(result.latency.is_some());
    }

    #[tokio::test]
    async fn test_refused_connection_counts_as_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = probe(port)
            .probe("127.0.0.1", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(result.reachable);
    }

    #[tokio::test]
    async fn test_blank_target_rejected() {
        let result = probe(53).probe("  ", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProbeError::InvalidTarget(_))));
    }

    #[test]
    fn test_address_forms() {
        let p = probe(53);
        assert_eq!(p.address("1.1.1.1"), "1.1.1.1:53");
        assert_eq!(p.address("1.1.1.1:443"), "1.1.1.1:443");
        assert_eq!(p.address("one.one.one.one"), "one.one.one.one:53");
        assert_eq!(p.address("2606:4700:4700::1111"), "[2606:4700:4700::1111]:53");
    }
}
