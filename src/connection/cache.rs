//! Registry of open connections addressed by index or alias.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Key accepted by [`ConnectionCache::switch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionKey {
    Index(usize),
    /// Alias, or a numeric index written as text.
    Text(String),
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<usize> for ConnectionKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ConnectionKey {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ConnectionKey {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Connections numbered from 1 in registration order.
///
/// Numbering restarts only after [`close_all`](Self::close_all).
#[derive(Debug)]
pub struct ConnectionCache<T> {
    connections: Vec<T>,
    aliases: HashMap<String, usize>,
    current: Option<usize>,
}

impl<T> Default for ConnectionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConnectionCache<T> {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            aliases: HashMap::new(),
            current: None,
        }
    }

    /// Store a connection, make it current and return its index.
    pub fn register(&mut self, connection: T, alias: Option<&str>) -> usize {
        self.connections.push(connection);
        let index = self.connections.len();
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            self.aliases.insert(alias.to_string(), index);
        }
        self.current = Some(index);
        index
    }

    fn resolve(&self, key: &ConnectionKey) -> Option<usize> {
        let index = match key {
            ConnectionKey::Index(index) => *index,
            ConnectionKey::Text(text) => match self.aliases.get(text) {
                Some(index) => *index,
                None => text.trim().parse().ok()?,
            },
        };
        (1..=self.connections.len()).contains(&index).then_some(index)
    }

    /// Make the connection named by `key` current and return it.
    pub fn switch(&mut self, key: impl Into<ConnectionKey>) -> Result<&mut T> {
        let key = key.into();
        let index = self
            .resolve(&key)
            .ok_or_else(|| Error::ConnectionNotFound { key: key.to_string() })?;
        self.current = Some(index);
        Ok(&mut self.connections[index - 1])
    }

    /// Look up a connection without changing the current one.
    pub fn get(&self, key: impl Into<ConnectionKey>) -> Result<&T> {
        let key = key.into();
        let index = self
            .resolve(&key)
            .ok_or_else(|| Error::ConnectionNotFound { key: key.to_string() })?;
        Ok(&self.connections[index - 1])
    }

    pub fn current(&self) -> Option<&T> {
        self.current.map(|index| &self.connections[index - 1])
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.map(|index| &mut self.connections[index - 1])
    }

    /// 1-based index of the current connection.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Forget the current connection. It stays registered and switchable.
    pub fn close_current(&mut self) -> Option<usize> {
        self.current.take()
    }

    /// Remove every connection and restart numbering at 1.
    pub fn close_all(&mut self) -> Vec<T> {
        self.aliases.clear();
        self.current = None;
        std::mem::take(&mut self.connections)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
