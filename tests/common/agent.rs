//! In-memory agent standing in for a UDP SNMP agent.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use snmp_keywords::engine::{BoxFuture, ConnectRequest, Connector, SnmpEngine};
use snmp_keywords::{Oid, Result, Value, VarBind};

#[derive(Debug, Default)]
struct AgentState {
    /// MIB view, ordered by arcs for walks.
    table: BTreeMap<Vec<u32>, Value>,
    connects: Vec<ConnectRequest>,
    gets: usize,
    walks: usize,
    sets: Vec<Vec<(Oid, Value)>>,
}

/// Shared agent state. Clones see the same table.
#[derive(Debug, Clone, Default)]
pub struct MockAgent {
    state: Arc<Mutex<AgentState>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().unwrap()
    }

    pub fn with(self, oid: Oid, value: Value) -> Self {
        self.insert(oid, value);
        self
    }

    pub fn insert(&self, oid: Oid, value: Value) {
        self.state().table.insert(oid.arcs().to_vec(), value);
    }

    pub fn value(&self, oid: &Oid) -> Option<Value> {
        self.state().table.get(oid.arcs()).cloned()
    }

    pub fn connects(&self) -> Vec<ConnectRequest> {
        self.state().connects.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.state().connects.len()
    }

    pub fn get_count(&self) -> usize {
        self.state().gets
    }

    pub fn walk_count(&self) -> usize {
        self.state().walks
    }

    /// Every SET request received, one entry per request.
    pub fn set_requests(&self) -> Vec<Vec<(Oid, Value)>> {
        self.state().sets.clone()
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector { agent: self.clone() }
    }
}

/// Connector handing out engines bound to one [`MockAgent`].
#[derive(Debug, Clone)]
pub struct MockConnector {
    agent: MockAgent,
}

impl MockConnector {
    pub fn agent(&self) -> &MockAgent {
        &self.agent
    }
}

impl Connector for MockConnector {
    type Engine = MockEngine;

    fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, Result<MockEngine>> {
        Box::pin(async move {
            self.agent.state().connects.push(request.clone());
            Ok(MockEngine {
                agent: self.agent.clone(),
                target: request.target(),
            })
        })
    }
}

/// One session with the in-memory agent.
#[derive(Debug)]
pub struct MockEngine {
    agent: MockAgent,
    pub target: String,
}

impl SnmpEngine for MockEngine {
    fn get<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, Result<VarBind>> {
        Box::pin(async move {
            let mut state = self.agent.state();
            state.gets += 1;
            let value = state
                .table
                .get(oid.arcs())
                .cloned()
                .unwrap_or(Value::NoSuchInstance);
            Ok(VarBind::new(oid.clone(), value))
        })
    }

    fn set_many<'a>(&'a self, varbinds: &'a [(Oid, Value)]) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        Box::pin(async move {
            let mut state = self.agent.state();
            state.sets.push(varbinds.to_vec());
            for (oid, value) in varbinds {
                state.table.insert(oid.arcs().to_vec(), value.clone());
            }
            Ok(varbinds
                .iter()
                .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
                .collect())
        })
    }

    fn walk<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        Box::pin(async move {
            let mut state = self.agent.state();
            state.walks += 1;
            let root = oid.arcs();
            Ok(state
                .table
                .range(root.to_vec()..)
                .filter(|(arcs, _)| arcs.len() > root.len())
                .take_while(|(arcs, _)| arcs.starts_with(root))
                .map(|(arcs, value)| VarBind::new(Oid::from_slice(arcs), value.clone()))
                .collect())
        })
    }
}
