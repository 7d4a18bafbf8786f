//! SNMP engine seam.
//!
//! Keywords talk to agents through [`SnmpEngine`], created by a
//! [`Connector`]. [`UdpConnector`] is the real implementation on top of
//! `async-snmp`; tests plug in an in-memory agent instead.

use std::future::{Future, poll_fn};
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::Context;
use std::time::Duration;

use async_snmp::{Auth, Client, Oid, Retry, UdpHandle, UsmBuilder, Value, VarBind};
use futures_core::Stream;
use tracing::debug;

use crate::connection::{ConnectionOptions, Credentials, UsmCredentials};
use crate::error::{Error, Operation, Result};

/// Boxed future returned by engine methods (dyn-compatible).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One SNMP session with an agent.
///
/// Error statuses and transport failures are reported as
/// [`Error::Request`]. Exception values (`noSuchObject`, `noSuchInstance`)
/// are returned as values; interpreting them is up to the caller.
pub trait SnmpEngine: Send + Sync {
    /// GET a single OID.
    fn get<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, Result<VarBind>>;

    /// SET every varbind in one request.
    fn set_many<'a>(&'a self, varbinds: &'a [(Oid, Value)]) -> BoxFuture<'a, Result<Vec<VarBind>>>;

    /// GETNEXT walk of the subtree under `oid`.
    fn walk<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, Result<Vec<VarBind>>>;
}

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub host: String,
    pub credentials: Credentials,
    pub options: ConnectionOptions,
}

impl ConnectRequest {
    pub fn target(&self) -> String {
        self.options.target(&self.host)
    }
}

/// Opens engine sessions.
pub trait Connector: Send + Sync {
    type Engine: SnmpEngine;

    fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, Result<Self::Engine>>;
}

/// Connector for UDP agents.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

impl Connector for UdpConnector {
    type Engine = ClientEngine;

    fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, Result<ClientEngine>> {
        Box::pin(async move {
            let target = request.target();
            let ConnectionOptions { timeout, retries, .. } = request.options;
            debug!(%target, ?timeout, retries, "connecting");

            let client = Client::builder(target, client_auth(&request.credentials))
                .timeout(timeout)
                .retry(Retry::fixed(retries, Duration::ZERO))
                .connect()
                .await
                .map_err(|e| Error::request(Operation::Connect, e))?;

            Ok(ClientEngine { client })
        })
    }
}

/// Engine credentials for a connection.
fn client_auth(credentials: &Credentials) -> Auth {
    match credentials {
        Credentials::Community(community) => Auth::v2c(community.expose()),
        Credentials::Usm(usm) => usm_auth(usm).into(),
    }
}

fn usm_auth(usm: &UsmCredentials) -> UsmBuilder {
    let mut builder = Auth::usm(usm.user.as_str());
    if let Some((protocol, password)) = &usm.auth {
        builder = builder.auth(*protocol, password.expose());
    }
    if let Some((protocol, password)) = &usm.privacy {
        builder = builder.privacy(*protocol, password.expose());
    }
    builder
}

/// Engine backed by an `async-snmp` client.
#[derive(Clone)]
pub struct ClientEngine {
    client: Client<UdpHandle>,
}

impl ClientEngine {
    /// Address of the agent this engine talks to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.client.peer_addr()
    }
}

impl SnmpEngine for ClientEngine {
    fn get<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, Result<VarBind>> {
        Box::pin(async move {
            self.client
                .get(oid)
                .await
                .map_err(|e| Error::request(Operation::Get, e))
        })
    }

    fn set_many<'a>(&'a self, varbinds: &'a [(Oid, Value)]) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        Box::pin(async move {
            self.client
                .set_many(varbinds)
                .await
                .map_err(|e| Error::request(Operation::Set, e))
        })
    }

    fn walk<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        Box::pin(async move {
            let walk = self
                .client
                .walk(oid.clone())
                .map_err(|e| Error::request(Operation::Walk, e))?;
            collect_walk(walk)
                .await
                .map_err(|e| Error::request(Operation::Walk, e))
        })
    }
}

/// Drain a walk stream, stopping at the first error.
pub async fn collect_walk<S, E>(walk: S) -> std::result::Result<Vec<VarBind>, E>
where
    S: Stream<Item = std::result::Result<VarBind, E>>,
{
    let mut pinned = Box::pin(walk);
    let mut results = Vec::new();

    loop {
        let item = poll_fn(|cx: &mut Context<'_>| pinned.as_mut().poll_next(cx)).await;

        match item {
            Some(Ok(vb)) => results.push(vb),
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }

    Ok(results)
}
