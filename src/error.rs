//! Error types for snmp-keywords.
//!
//! Every keyword surfaces its failure synchronously as one of these variants.
//! Nothing is retried here; retry and timeout policy belongs to the engine.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an OID notation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Empty component between two dots (or a trailing dot).
    EmptyComponent,
    /// Symbolic form without a `.` separated suffix.
    MissingSuffix,
    /// Empty module or symbol name around `::`.
    EmptySymbol,
    /// A symbolic name appeared where a numeric arc is required.
    NonNumericArc,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::EmptyComponent => write!(f, "empty component"),
            Self::MissingSuffix => write!(f, "symbol must be followed by a '.' suffix"),
            Self::EmptySymbol => write!(f, "empty symbol name"),
            Self::NonNumericArc => write!(f, "non-numeric arc"),
        }
    }
}

/// Why an index notation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorKind {
    /// Empty index string or list.
    Empty,
    /// Component is not a non-negative 32-bit integer.
    NotAnInteger,
    /// Requested index length of zero.
    ZeroLength,
}

impl std::fmt::Display for IndexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty index"),
            Self::NotAnInteger => write!(f, "component is not a non-negative integer"),
            Self::ZeroLength => write!(f, "index length must be at least 1"),
        }
    }
}

/// Keyword operation that issued an engine request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Get,
    Set,
    Walk,
    TrapReceive,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "SNMP CONNECT"),
            Self::Get => write!(f, "SNMP GET"),
            Self::Set => write!(f, "SNMP SET"),
            Self::Walk => write!(f, "SNMP WALK"),
            Self::TrapReceive => write!(f, "SNMP TRAP RECEIVE"),
        }
    }
}

/// Which half of a USM configuration a protocol name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    Authentication,
    Encryption,
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Encryption => write!(f, "encryption"),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A request keyword ran without an active connection.
    #[error("no transport host set")]
    NoActiveConnection,

    /// `switch_connection` was given an unknown index or alias.
    #[error("non-existing index or alias '{key}'")]
    ConnectionNotFound { key: String },

    /// The engine reported a transport failure or an error status.
    #[error("{operation} failed: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: Box<async_snmp::Error>,
    },

    /// The agent answered noSuchObject, noSuchInstance or endOfMibView.
    #[error("object with OID {oid} not found")]
    ObjectNotFound { oid: String },

    /// `get_display_string` received something other than an OCTET STRING.
    #[error("returned value for {oid} is not an octet string")]
    NotDisplayString { oid: String },

    /// Local I/O error (socket bind, MIB directory scan).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed OID notation.
    #[error("invalid OID '{input}': {kind}")]
    InvalidOid { input: Box<str>, kind: OidErrorKind },

    /// Malformed index notation.
    #[error("invalid index '{input}': {kind}")]
    InvalidIndex { input: Box<str>, kind: IndexErrorKind },

    /// A value could not be converted to the requested SNMP type.
    #[error("cannot convert '{input}' to {syntax}: {reason}")]
    InvalidValue {
        syntax: &'static str,
        input: Box<str>,
        reason: &'static str,
    },

    /// The MIB resolver has no node for this symbol.
    #[error("unknown MIB symbol {}", display_symbol(module, name))]
    UnresolvedSymbol { module: String, name: String },

    /// `add_mib_search_path` was given a missing directory.
    #[error("path \"{}\" does not exist", path.display())]
    MibPathNotFound { path: PathBuf },

    /// No search path holds a definition for this MIB module.
    #[error("MIB module {name} not found in search paths")]
    MibNotFound { name: String },

    /// A MIB definition file could not be parsed.
    #[error("failed to load MIB definition {}: {source}", path.display())]
    MibLoad {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Keyword arguments have the wrong shape or count.
    #[error("invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    /// `find_index` found no row satisfying every column.
    #[error("no index found for the given matches")]
    NoIndexFound,

    /// `find_index` found several rows satisfying every column.
    #[error("ambiguous match, found {count} matching indices")]
    AmbiguousIndex { count: usize },

    /// `find_oid_by_value` found no row with this value.
    #[error("value \"{value}\" not found")]
    ValueNotFound { value: String },

    /// Unknown USM protocol name.
    #[error("invalid {kind} protocol {name}")]
    InvalidProtocol { kind: ProtocolKind, name: String },

    /// Protocol name is valid but cannot be used with this configuration.
    #[error("unsupported {kind} protocol {name}: {reason}")]
    UnsupportedProtocol {
        kind: ProtocolKind,
        name: String,
        reason: &'static str,
    },

    /// A notification arrived in a version the trap loop does not decode.
    #[error("only SNMP v2c traps are supported, received {version}")]
    UnsupportedVersion { version: async_snmp::Version },

    /// No trap filter registered under this name.
    #[error("trap filter \"{name}\" not found")]
    TrapFilterNotFound { name: String },

    /// No matching trap arrived before the deadline.
    #[error("no matching trap received in {timeout:?}")]
    TrapTimeout { timeout: Duration },
}

fn display_symbol(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module, name)
    }
}

impl Error {
    /// Wrap an engine error with the keyword operation that caused it.
    pub fn request(operation: Operation, source: Box<async_snmp::Error>) -> Self {
        Self::Request { operation, source }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid(input: impl Into<Box<str>>, kind: OidErrorKind) -> Self {
        Self::InvalidOid {
            input: input.into(),
            kind,
        }
    }

    /// Create an invalid index error with the input that failed.
    pub fn invalid_index(input: impl Into<Box<str>>, kind: IndexErrorKind) -> Self {
        Self::InvalidIndex {
            input: input.into(),
            kind,
        }
    }

    /// Create an invalid arguments error.
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
        }
    }

    /// True for connection-state errors that happen before any I/O.
    pub fn is_connection_state(&self) -> bool {
        matches!(
            self,
            Self::NoActiveConnection | Self::ConnectionNotFound { .. }
        )
    }

    /// True for parse failures of OIDs, indices, values or MIB definitions.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::InvalidOid { .. }
                | Self::InvalidIndex { .. }
                | Self::InvalidValue { .. }
                | Self::UnresolvedSymbol { .. }
                | Self::MibLoad { .. }
        )
    }
}
