//! Waiting for SNMPv2c traps.
//!
//! A [`TrapListener`] binds a UDP port and returns the first trap accepted
//! by a [`TrapFilter`], or fails once the timeout elapses.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use snmp_keywords::trap::{TrapFilter, TrapListener};
//!
//! # async fn example() -> snmp_keywords::Result<()> {
//! let filter = TrapFilter::new().host("192.0.2.10");
//! let mut listener = TrapListener::bind("0.0.0.0", 1620).await?;
//! let trap = listener.wait_for(&filter, Duration::from_secs(5)).await?;
//! println!("{} from {}", trap.trap_oid, trap.source);
//! # Ok(())
//! # }
//! ```

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_snmp::notification::{Notification, NotificationReceiver};
use async_snmp::{Oid, VarBind};
use tracing::{debug, info, warn};

use crate::error::{Error, Operation, Result};
use crate::oid::format_numeric_oid;

/// Default time to wait for a trap.
pub const DEFAULT_TRAP_TIMEOUT: Duration = Duration::from_secs(5);
/// Default listen address.
pub const DEFAULT_TRAP_HOST: &str = "0.0.0.0";
/// Default listen port. Unprivileged, unlike the standard 162.
pub const DEFAULT_TRAP_PORT: u16 = 1620;

/// A received SNMPv2c trap.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapEvent {
    pub source: SocketAddr,
    pub community: String,
    /// sysUpTime.0 in hundredths of a second.
    pub uptime: u32,
    /// snmpTrapOID.0
    pub trap_oid: Oid,
    /// Varbinds following sysUpTime.0 and snmpTrapOID.0.
    pub varbinds: Vec<VarBind>,
}

/// Accepts traps by sending host and trap OID. Empty filters accept all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapFilter {
    host: Option<String>,
    trap_oid: Option<Oid>,
}

impl TrapFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept traps sent from this address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into()).filter(|h: &String| !h.is_empty());
        self
    }

    /// Only accept traps whose snmpTrapOID.0 equals `oid`.
    pub fn trap_oid(mut self, oid: Oid) -> Self {
        self.trap_oid = Some(oid);
        self
    }

    fn host_matches(&self, source: IpAddr) -> bool {
        let Some(host) = &self.host else {
            return true;
        };
        match host.parse::<IpAddr>() {
            Ok(expected) => expected.to_canonical() == source.to_canonical(),
            Err(_) => source.to_canonical().to_string() == *host,
        }
    }

    pub fn matches(&self, event: &TrapEvent) -> bool {
        if !self.host_matches(event.source.ip()) {
            return false;
        }
        match &self.trap_oid {
            Some(oid) => *oid == event.trap_oid,
            None => true,
        }
    }
}

/// Where and how long `wait_until_trap_is_received` listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapWaitOptions {
    pub timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for TrapWaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TRAP_TIMEOUT,
            host: DEFAULT_TRAP_HOST.to_string(),
            port: DEFAULT_TRAP_PORT,
        }
    }
}

impl TrapWaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Turn a decoded notification into a trap event.
///
/// Returns `Ok(None)` for informs, which are skipped. SNMPv1 and SNMPv3
/// notifications are rejected.
pub fn check_version(notification: Notification, source: SocketAddr) -> Result<Option<TrapEvent>> {
    match notification {
        Notification::TrapV2c {
            community,
            uptime,
            trap_oid,
            varbinds,
            ..
        } => Ok(Some(TrapEvent {
            source,
            community: String::from_utf8_lossy(&community).into_owned(),
            uptime,
            trap_oid,
            varbinds,
        })),
        Notification::InformV2c { .. } => Ok(None),
        other => Err(Error::UnsupportedVersion {
            version: other.version(),
        }),
    }
}

/// UDP listener for one trap wait at a time.
pub struct TrapListener {
    receiver: NotificationReceiver,
}

impl TrapListener {
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
        let receiver = NotificationReceiver::bind(&addr)
            .await
            .map_err(|e| Error::request(Operation::TrapReceive, e))?;
        debug!(local_addr = %receiver.local_addr(), "trap listener bound");
        Ok(Self { receiver })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.receiver.local_addr()
    }

    /// Return the first trap accepted by `filter` within `timeout`.
    pub async fn wait_for(&mut self, filter: &TrapFilter, timeout: Duration) -> Result<TrapEvent> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let (notification, source) = match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
                Err(_) => return Err(Error::TrapTimeout { timeout }),
                Ok(received) => received.map_err(|e| {
                    warn!(error = %e, "trap receive failed");
                    Error::request(Operation::TrapReceive, e)
                })?,
            };

            let Some(event) = check_version(notification, source)? else {
                debug!(%source, "skipping inform");
                continue;
            };

            if filter.matches(&event) {
                info!(%source, trap_oid = %format_numeric_oid(&event.trap_oid), "trap received");
                return Ok(event);
            }
            debug!(%source, trap_oid = %format_numeric_oid(&event.trap_oid), "trap did not match filter");
        }
    }
}

/// Bind, wait for one matching trap and release the port.
pub async fn wait_for_trap(filter: &TrapFilter, options: &TrapWaitOptions) -> Result<TrapEvent> {
    let mut listener = TrapListener::bind(&options.host, options.port).await?;
    listener.wait_for(filter, options.timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(source: &str, trap_oid: &[u32]) -> TrapEvent {
        TrapEvent {
            source: source.parse().unwrap(),
            community: "public".into(),
            uptime: 0,
            trap_oid: Oid::from_slice(trap_oid),
            varbinds: Vec::new(),
        }
    }

    const COLD_START: &[u32] = &[1, 3, 6, 1, 6, 3, 1, 1, 5, 1];
    const WARM_START: &[u32] = &[1, 3, 6, 1, 6, 3, 1, 1, 5, 2];

    #[test]
    fn test_empty_filter_accepts_all() {
        assert!(TrapFilter::new().matches(&event("10.0.0.1:162", COLD_START)));
    }

    #[test]
    fn test_host_filter() {
        let filter = TrapFilter::new().host("10.0.0.1");
        assert!(filter.matches(&event("10.0.0.1:5000", COLD_START)));
        assert!(!filter.matches(&event("10.0.0.2:5000", COLD_START)));
        // v4-mapped sources compare as IPv4
        assert!(filter.matches(&event("[::ffff:10.0.0.1]:5000", COLD_START)));
    }

    #[test]
    fn test_empty_host_is_no_filter() {
        let filter = TrapFilter::new().host("");
        assert!(filter.matches(&event("10.0.0.2:5000", COLD_START)));
    }

    #[test]
    fn test_trap_oid_filter() {
        let filter = TrapFilter::new().trap_oid(Oid::from_slice(COLD_START));
        assert!(filter.matches(&event("10.0.0.1:162", COLD_START)));
        assert!(!filter.matches(&event("10.0.0.1:162", WARM_START)));
    }

    #[test]
    fn test_combined_filter() {
        let filter = TrapFilter::new()
            .host("10.0.0.1")
            .trap_oid(Oid::from_slice(WARM_START));
        assert!(filter.matches(&event("10.0.0.1:162", WARM_START)));
        assert!(!filter.matches(&event("10.0.0.1:162", COLD_START)));
        assert!(!filter.matches(&event("10.0.0.9:162", WARM_START)));
    }

    #[test]
    fn test_wait_options_defaults() {
        let opts = TrapWaitOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.host, "0.0.0.0");
        assert_eq!(opts.port, 1620);
    }
}
