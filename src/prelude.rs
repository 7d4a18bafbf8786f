//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,no_run
//! use snmp_keywords::prelude::*;
//! ```
//!
//! This imports:
//! - The keyword surface: [`SnmpSession`], [`ConnectionOptions`], [`TrapWaitOptions`]
//! - Argument shapes: [`OidInput`], [`IndexInput`], [`ValueInput`], [`SetValue`], [`TableArg`]
//! - Results: [`WalkEntry`], [`Index`], [`TrapEvent`], [`Value`], [`Oid`]
//! - Error handling: [`Error`], [`Result`]
//! - Table helpers: [`find_index`], [`index_from_oid`]

pub use crate::connection::ConnectionOptions;
pub use crate::error::{Error, Result};
pub use crate::index::{Index, IndexInput, index_from_oid};
pub use crate::oid::OidInput;
pub use crate::session::SnmpSession;
pub use crate::table::{TableArg, WalkEntry, find_index};
pub use crate::trap::{TrapEvent, TrapWaitOptions};
pub use crate::value::{SetValue, ValueInput};
pub use async_snmp::{Oid, Value};
