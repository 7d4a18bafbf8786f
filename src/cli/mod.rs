//! CLI utilities for snmp-keywords.
//!
//! Argument parsing and output formatting for the `snmpkw` tool, which
//! runs single keywords from a shell.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod output;
