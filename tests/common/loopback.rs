//! Real `async-snmp` agent on a loopback port.
//!
//! Exercises the UDP connector end to end. The agent task is aborted when
//! the [`LoopbackAgent`] is dropped.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use async_snmp::Agent;
use async_snmp::handler::{BoxFuture, GetNextResult, GetResult, MibHandler, RequestContext, SetResult};
use snmp_keywords::{Oid, Value, VarBind};
use tokio::task::JoinHandle;

use super::fixtures::COMMUNITY;

/// Sorted OID table answering GET, GETNEXT and SET.
#[derive(Default)]
pub struct TableHandler {
    data: RwLock<BTreeMap<Oid, Value>>,
}

impl TableHandler {
    pub fn get(&self, oid: &Oid) -> Option<Value> {
        self.data.read().unwrap().get(oid).cloned()
    }
}

impl MibHandler for TableHandler {
    fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
        let result = match self.data.read().unwrap().get(oid) {
            Some(value) => GetResult::Value(value.clone()),
            None => GetResult::NoSuchInstance,
        };
        Box::pin(async move { result })
    }

    fn get_next<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
        let result = self
            .data
            .read()
            .unwrap()
            .range(oid..)
            .find(|(k, _)| *k > oid)
            .map(|(k, v)| GetNextResult::Value(VarBind::new(k.clone(), v.clone())))
            .unwrap_or(GetNextResult::EndOfMibView);
        Box::pin(async move { result })
    }

    fn test_set<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid, _value: &'a Value) -> BoxFuture<'a, SetResult> {
        Box::pin(async { SetResult::Ok })
    }

    fn commit_set<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid, value: &'a Value) -> BoxFuture<'a, SetResult> {
        self.data.write().unwrap().insert(oid.clone(), value.clone());
        Box::pin(async { SetResult::Ok })
    }
}

pub struct LoopbackAgent {
    addr: SocketAddr,
    handler: Arc<TableHandler>,
    task: JoinHandle<()>,
}

impl LoopbackAgent {
    /// Start an agent serving `data` under `.1.3.6` with the fixture community.
    pub async fn start(data: impl IntoIterator<Item = (Oid, Value)>) -> Self {
        let handler = Arc::new(TableHandler {
            data: RwLock::new(data.into_iter().collect()),
        });

        let agent = Agent::builder()
            .bind("127.0.0.1:0")
            .community(COMMUNITY.as_bytes())
            .handler(Oid::from_slice(&[1, 3, 6]), handler.clone())
            .build()
            .await
            .expect("failed to build loopback agent");
        let addr = agent.local_addr();

        let task = tokio::spawn(async move {
            let _ = agent.run().await;
        });
        tokio::task::yield_now().await;

        Self { addr, handler, task }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn value(&self, oid: &Oid) -> Option<Value> {
        self.handler.get(oid)
    }
}

impl Drop for LoopbackAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}
