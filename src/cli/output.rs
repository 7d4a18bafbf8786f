//! Output formatting for the `snmpkw` tool.
//!
//! Every command result has a serializable form; human output is derived
//! from the same structs.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::index::Index;
use crate::mib::MibResolver;
use crate::oid::format_numeric_oid;
use crate::table::WalkEntry;
use crate::trap::TrapEvent;
use crate::value::{is_printable, render_value};
use crate::{Value, VarBind};

/// A single fetched value.
#[derive(Debug, Serialize)]
pub struct ValueResult {
    pub oid: String,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl ValueResult {
    pub fn new(oid: impl Into<String>, value: &Value) -> Self {
        let (value_type, json, formatted) = format_value(value);
        Self {
            oid: oid.into(),
            value_type,
            value: json,
            formatted,
        }
    }

    fn from_varbind(vb: &VarBind, mib: &MibResolver) -> Self {
        Self::new(mib.describe(&vb.oid), &vb.value)
    }
}

/// One walk row.
#[derive(Debug, Serialize)]
pub struct EntryResult<'a> {
    pub oid: String,
    pub value: &'a str,
}

/// Result of `find-index` and index extraction.
#[derive(Debug, Serialize)]
pub struct IndexResult<'a> {
    pub index: &'a [u32],
    pub dotted: String,
}

/// A received trap.
#[derive(Debug, Serialize)]
pub struct TrapResult {
    pub source: String,
    pub community: String,
    pub uptime: u32,
    pub trap_oid: String,
    pub trap_name: String,
    pub varbinds: Vec<ValueResult>,
}

/// Output context for formatting.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    pub format: OutputFormat,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write one GET result.
    pub fn write_value<W: Write>(&self, w: &mut W, oid: &str, value: &Value) -> io::Result<()> {
        let result = ValueResult::new(oid, value);
        match self.format {
            OutputFormat::Human => write_value_line(w, &result),
            OutputFormat::Json => write_json(w, &result),
        }
    }

    /// Write a bare string result, such as a display string or an OID.
    pub fn write_text<W: Write>(&self, w: &mut W, text: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => writeln!(w, "{}", text),
            OutputFormat::Json => write_json(w, &text),
        }
    }

    pub fn write_walk<W: Write>(&self, w: &mut W, entries: &[WalkEntry]) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => {
                for entry in entries {
                    writeln!(w, "{}", entry)?;
                }
                Ok(())
            }
            OutputFormat::Json => {
                let rows: Vec<EntryResult<'_>> = entries
                    .iter()
                    .map(|entry| EntryResult {
                        oid: entry.oid.to_string(),
                        value: &entry.value,
                    })
                    .collect();
                write_json(w, &rows)
            }
        }
    }

    pub fn write_index<W: Write>(&self, w: &mut W, index: &Index) -> io::Result<()> {
        let result = IndexResult {
            index: index.arcs(),
            dotted: index.to_string(),
        };
        match self.format {
            OutputFormat::Human => writeln!(w, "{}", result.dotted),
            OutputFormat::Json => write_json(w, &result),
        }
    }

    /// Write a trap, naming OIDs through `mib`.
    pub fn write_trap<W: Write>(&self, w: &mut W, event: &TrapEvent, mib: &MibResolver) -> io::Result<()> {
        let result = TrapResult {
            source: event.source.to_string(),
            community: event.community.clone(),
            uptime: event.uptime,
            trap_oid: format_numeric_oid(&event.trap_oid),
            trap_name: mib.describe(&event.trap_oid),
            varbinds: event
                .varbinds
                .iter()
                .map(|vb| ValueResult::from_varbind(vb, mib))
                .collect(),
        };
        match self.format {
            OutputFormat::Human => {
                writeln!(w, "Trap {} from {}", result.trap_name, result.source)?;
                writeln!(w, "  community: {}", result.community)?;
                writeln!(w, "  uptime:    {}", format_timeticks(result.uptime))?;
                for vb in &result.varbinds {
                    write!(w, "  ")?;
                    write_value_line(w, vb)?;
                }
                Ok(())
            }
            OutputFormat::Json => write_json(w, &result),
        }
    }
}

fn write_value_line<W: Write>(w: &mut W, result: &ValueResult) -> io::Result<()> {
    write!(w, "{} = {}: ", result.oid, result.value_type)?;
    if let Some(ref formatted) = result.formatted {
        return writeln!(w, "{}", formatted);
    }
    match &result.value {
        serde_json::Value::String(s) => writeln!(w, "\"{}\"", s),
        serde_json::Value::Null => writeln!(w),
        other => writeln!(w, "{}", other),
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, result: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

/// Type name, JSON value and optional human form of a value.
fn format_value(value: &Value) -> (&'static str, serde_json::Value, Option<String>) {
    match value {
        Value::Integer(v) => ("INTEGER", (*v).into(), None),
        Value::OctetString(bytes) if is_printable(bytes) => ("STRING", render_value(value).into(), None),
        Value::OctetString(_) => ("Hex-STRING", render_value(value).into(), None),
        Value::Null => ("NULL", serde_json::Value::Null, None),
        Value::ObjectIdentifier(_) => ("OID", render_value(value).into(), None),
        Value::IpAddress(_) => ("IpAddress", render_value(value).into(), None),
        Value::Counter32(v) => ("Counter32", (*v).into(), None),
        Value::Gauge32(v) => ("Gauge32", (*v).into(), None),
        Value::TimeTicks(v) => (
            "TimeTicks",
            (*v).into(),
            Some(format!("({}) {}", v, format_timeticks(*v))),
        ),
        Value::Opaque(_) => ("Opaque", render_value(value).into(), None),
        Value::Counter64(v) => ("Counter64", (*v).into(), None),
        Value::NoSuchObject => (
            "NoSuchObject",
            serde_json::Value::Null,
            Some("No Such Object available".into()),
        ),
        Value::NoSuchInstance => (
            "NoSuchInstance",
            serde_json::Value::Null,
            Some("No Such Instance currently exists".into()),
        ),
        Value::EndOfMibView => (
            "EndOfMibView",
            serde_json::Value::Null,
            Some("No more variables left in this MIB View".into()),
        ),
        #[allow(unreachable_patterns)]
        other => ("Unknown", render_value(other).into(), None),
    }
}

/// Format TimeTicks as human-readable duration.
fn format_timeticks(centiseconds: u32) -> String {
    let total_seconds = centiseconds / 100;
    let cs = centiseconds % 100;

    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}.{:02}", days, hours, minutes, seconds, cs)
    } else {
        format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs)
    }
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}
