//! TCP connect probing.
//!
//! A probe connects to each configured port in turn and closes the socket
//! straight away. No bytes are exchanged.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tracing::trace;

/// Outcome of probing one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub reachable: bool,
    pub open_ports: Vec<u16>,
}

impl ProbeResult {
    pub fn from_open_ports(open_ports: Vec<u16>) -> Self {
        Self {
            reachable: !open_ports.is_empty(),
            open_ports,
        }
    }
}

/// Checks a single host for reachability.
///
/// Implementations must resolve by `deadline`; an `Err` means probing itself
/// failed (e.g. a hostname that does not resolve), not that the host is down.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str, deadline: Instant) -> anyhow::Result<ProbeResult>;
}

/// Connect-and-close probe over a fixed port list.
#[derive(Debug, Clone)]
pub struct PortProbe {
    pub ports: Vec<u16>,
    /// Upper bound for a single connect, on top of the host deadline.
    pub connect_timeout: Duration,
}

impl PortProbe {
    pub fn new(ports: Vec<u16>, connect_timeout: Duration) -> Self {
        Self {
            ports,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Prober for PortProbe {
    async fn probe(&self, host: &str, deadline: Instant) -> anyhow::Result<ProbeResult> {
        if self.ports.is_empty() {
            return Ok(ProbeResult::default());
        }

        let addr = resolve(host, deadline).await?;

        let mut open_ports = Vec::new();
        for &port in &self.ports {
            let connect_deadline = deadline.min(Instant::now() + self.connect_timeout);
            if handshake(SocketAddr::new(addr, port), connect_deadline).await {
                open_ports.push(port);
            }
        }

        Ok(ProbeResult::from_open_ports(open_ports))
    }
}

async fn resolve(host: &str, deadline: Instant) -> anyhow::Result<IpAddr> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(addr);
    }

    let mut addrs = timeout_at(deadline, tokio::net::lookup_host((host, 0)))
        .await
        .with_context(|| format!("resolving {host} timed out"))?
        .with_context(|| format!("failed to resolve {host}"))?;

    addrs
        .next()
        .map(|sock| sock.ip())
        .with_context(|| format!("{host} resolved to no addresses"))
}

async fn handshake(socket_addr: SocketAddr, deadline: Instant) -> bool {
    match timeout_at(deadline, TcpStream::connect(socket_addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            trace!("{socket_addr} accepted the connection");
            true
        }
        Ok(Err(_)) | Err(_) => false,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[tokio::test]
    async fn open_port_is_reported_in_probe_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed = closed_port().await;

        let probe = PortProbe::new(vec![closed, open], Duration::from_secs(1));
        let deadline = Instant::now() + Duration::from_secs(2);
        let result = probe.probe("127.0.0.1", deadline).await.unwrap();

        assert!(result.reachable);
        assert_eq!(result.open_ports, vec![open]);
    }

    #[tokio::test]
    async fn nothing_listening_means_unreachable() {
        let closed = closed_port().await;
        let probe = PortProbe::new(vec![closed], Duration::from_millis(500));
        let deadline = Instant::now() + Duration::from_secs(1);
        let result = probe.probe("127.0.0.1", deadline).await.unwrap();

        assert_eq!(result, ProbeResult::default());
    }

    #[tokio::test]
    async fn empty_port_list_short_circuits() {
        let probe = PortProbe::new(Vec::new(), Duration::from_millis(10));
        let result = probe
            .probe("does-not-matter.invalid", Instant::now())
            .await
            .unwrap();
        assert!(!result.reachable);
    }

    #[tokio::test]
    #[ignore]
    async fn unresolvable_hostname_is_a_probe_error() {
        let probe = PortProbe::new(vec![22], Duration::from_millis(500));
        let deadline = Instant::now() + Duration::from_secs(3);
        assert!(probe.probe("no-such-host.invalid", deadline).await.is_err());
    }
}
