//! Shared test utilities for snmp-keywords integration tests.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

mod agent;
mod fixtures;
mod loopback;

pub use agent::{MockAgent, MockConnector, MockEngine};
pub use fixtures::*;
pub use loopback::{LoopbackAgent, TableHandler};
