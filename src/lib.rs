//! # snmp-keywords
//!
//! Keyword-style SNMP operations for test automation, built on `async-snmp`.
//!
//! ## Features
//!
//! - GET, SET and WALK against SNMPv2c and SNMPv3 agents
//! - Human-friendly OID notations (`SNMPv2-MIB::sysDescr.0`,
//!   `.iso.org.6.internet.2.1.1.1.0`, `sysDescr.0`)
//! - Table row lookup by column values
//! - Waiting for SNMPv2c traps matching a filter
//! - Several open connections addressed by index or alias
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmp_keywords::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let mut session = SnmpSession::new();
//!     session
//!         .open_v2c_connection("192.168.1.1", "public", ConnectionOptions::default())
//!         .await?;
//!
//!     let descr = session.get_display_string("sysDescr.0", IndexInput::List(vec![])).await?;
//!     println!("sysDescr: {}", descr);
//!
//!     for entry in session.walk("IF-MIB::ifEntry.2").await? {
//!         println!("{}", entry);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Traps
//!
//! ```rust,no_run
//! use snmp_keywords::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let mut session = SnmpSession::new();
//! session.new_trap_filter("cold", None, Some(".1.3.6.1.6.3.1.1.5.1"))?;
//! let trap = session
//!     .wait_until_trap_is_received("cold", &TrapWaitOptions::default())
//!     .await?;
//! println!("trap from {}", trap.source);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod engine;
pub mod error;
pub mod index;
pub mod mib;
pub mod oid;
pub mod prelude;
pub mod session;
pub mod table;
pub mod trap;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use connection::{ConnectionCache, ConnectionKey, ConnectionOptions, Credentials, UsmCredentials};
pub use engine::{BoxFuture, ConnectRequest, Connector, SnmpEngine, UdpConnector};
pub use error::{Error, IndexErrorKind, OidErrorKind, Operation, ProtocolKind, Result};
pub use index::{Index, IndexInput, IndexItem, index_from_oid, parse_idx};
pub use mib::MibResolver;
pub use oid::{OidComponent, OidInput, ParsedOid, Symbol, format_oid, parse_oid};
pub use session::SnmpSession;
pub use table::{TableArg, WalkEntry, find_index, find_oid_by_value};
pub use trap::{TrapEvent, TrapFilter, TrapListener, TrapWaitOptions, wait_for_trap};
pub use value::{SetValue, ValueInput, render_value};

// Engine types that appear in this crate's API.
pub use async_snmp::{Oid, Value, VarBind};
