//! Open connections and their registry.

mod cache;
mod settings;

use std::collections::HashMap;

pub use cache::{ConnectionCache, ConnectionKey};
pub use settings::{
    ConnectionOptions, Credentials, DEFAULT_PORT, DEFAULT_RETRIES, DEFAULT_TIMEOUT, Secret, UsmCredentials,
    parse_auth_protocol, parse_priv_protocol,
};

use crate::table::WalkEntry;

/// One registered agent session.
#[derive(Debug)]
pub struct Connection<E> {
    engine: E,
    target: String,
    /// Walk results stored by `prefetch_oid_table`, keyed by the OID text
    /// the walk was started with.
    prefetched: HashMap<String, Vec<WalkEntry>>,
}

impl<E> Connection<E> {
    pub fn new(engine: E, target: impl Into<String>) -> Self {
        Self {
            engine,
            target: target.into(),
            prefetched: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// `host:port` this connection talks to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn prefetched(&self, key: &str) -> Option<&[WalkEntry]> {
        self.prefetched.get(key).map(Vec::as_slice)
    }

    pub fn store_prefetched(&mut self, key: impl Into<String>, entries: Vec<WalkEntry>) {
        self.prefetched.insert(key.into(), entries);
    }
}
