//! Command-line argument structures for the `snmpkw` tool.
//!
//! The groups here are flattened into each subcommand, so every keyword
//! takes the same connection, MIB and output flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::connection::{ConnectionOptions, DEFAULT_PORT};
use crate::engine::Connector;
use crate::error::{Error, Result};
use crate::session::SnmpSession;
use crate::value::{
    convert_to_counter32, convert_to_counter64, convert_to_gauge32, convert_to_integer, convert_to_integer32,
    convert_to_ip_address, convert_to_octet_string, convert_to_timeticks, convert_to_unsigned32,
};
use crate::{SetValue, ValueInput};

/// Output format for CLI tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with type information.
    #[default]
    Human,
    /// JSON output for scripting.
    Json,
}

/// Agent address and SNMPv2c settings.
#[derive(Debug, Parser)]
pub struct ConnectArgs {
    /// Agent host name or address.
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Agent UDP port.
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Community string (v2c).
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Request timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "1")]
    pub timeout: f64,

    /// Retry count.
    #[arg(short = 'r', long = "retries", default_value = "5")]
    pub retries: u32,
}

impl ConnectArgs {
    /// Connection options for these flags.
    pub fn options(&self) -> Result<ConnectionOptions> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .map_err(|_| Error::invalid_arguments(format!("invalid timeout: {}", self.timeout)))?;
        Ok(ConnectionOptions::new()
            .port(self.port)
            .timeout(timeout)
            .retries(self.retries))
    }

    /// Open a v2c or v3 connection on `session` depending on `v3`.
    pub async fn open<C: Connector>(&self, v3: &V3Args, session: &mut SnmpSession<C>) -> Result<usize> {
        let options = self.options()?;
        match &v3.username {
            Some(user) => {
                session
                    .open_v3_connection(
                        &self.target,
                        user,
                        v3.auth_password.as_deref(),
                        v3.priv_password.as_deref(),
                        v3.auth_protocol.as_deref(),
                        v3.priv_protocol.as_deref(),
                        options,
                    )
                    .await
            }
            None => {
                session
                    .open_v2c_connection(&self.target, &self.community, options)
                    .await
            }
        }
    }
}

/// SNMPv3 security arguments.
#[derive(Debug, Parser)]
pub struct V3Args {
    /// Security name (switches to SNMPv3).
    #[arg(short = 'u', long = "username")]
    pub username: Option<String>,

    /// Authentication protocol: MD5, SHA or none.
    #[arg(short = 'a', long = "auth-protocol")]
    pub auth_protocol: Option<String>,

    /// Authentication passphrase.
    #[arg(short = 'A', long = "auth-password")]
    pub auth_password: Option<String>,

    /// Privacy protocol: DES, 3DES, AES128, AES192, AES256 or none.
    #[arg(short = 'x', long = "priv-protocol")]
    pub priv_protocol: Option<String>,

    /// Privacy passphrase.
    #[arg(short = 'X', long = "priv-password")]
    pub priv_password: Option<String>,
}

impl V3Args {
    pub fn is_v3(&self) -> bool {
        self.username.is_some()
    }
}

/// MIB loading arguments.
#[derive(Debug, Parser)]
pub struct MibArgs {
    /// Directory of JSON MIB definitions. May be repeated.
    #[arg(long = "mib-path", value_name = "DIR")]
    pub mib_paths: Vec<PathBuf>,

    /// MIB module to load up front. May be repeated.
    #[arg(long = "preload", value_name = "MODULE")]
    pub preload: Vec<String>,

    /// Load every module found on the MIB paths.
    #[arg(long = "preload-all", conflicts_with = "preload")]
    pub preload_all: bool,
}

impl MibArgs {
    /// Register search paths and preload modules on `session`.
    pub fn apply<C: Connector>(&self, session: &mut SnmpSession<C>) -> Result<()> {
        for path in &self.mib_paths {
            session.add_mib_search_path(path)?;
        }
        if self.preload_all {
            session.preload_mibs(&[])?;
        } else if !self.preload.is_empty() {
            let names: Vec<&str> = self.preload.iter().map(String::as_str).collect();
            session.preload_mibs(&names)?;
        }
        Ok(())
    }
}

/// Output control arguments.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format: human or json.
    #[arg(short = 'O', long = "format", default_value = "human")]
    pub format: OutputFormat,

    /// Enable debug logging (snmp_keywords=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (snmp_keywords=trace,async_snmp=debug).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl OutputArgs {
    /// Initialize tracing based on debug/trace flags.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "snmp_keywords=trace,async_snmp=debug"
        } else if self.debug {
            "snmp_keywords=debug"
        } else {
            "snmp_keywords=warn"
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Type specifier for `set` values.
///
/// Without one, the value is typed from the MIB syntax of the target
/// object, falling back to INTEGER for numbers and OCTET STRING otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    /// OCTET STRING
    #[value(name = "s")]
    OctetString,
    /// INTEGER
    #[value(name = "i")]
    Integer,
    /// Integer32
    #[value(name = "I")]
    Integer32,
    /// Counter32
    #[value(name = "c")]
    Counter32,
    /// Counter64
    #[value(name = "C")]
    Counter64,
    /// Gauge32
    #[value(name = "g")]
    Gauge32,
    /// Unsigned32
    #[value(name = "u")]
    Unsigned32,
    /// TimeTicks
    #[value(name = "t")]
    TimeTicks,
    /// IpAddress
    #[value(name = "a")]
    IpAddress,
}

impl ValueType {
    /// Convert `text` to a value of this type.
    pub fn convert(self, text: &str) -> Result<crate::Value> {
        match self {
            Self::OctetString => convert_to_octet_string(text),
            Self::Integer => convert_to_integer(text),
            Self::Integer32 => convert_to_integer32(text),
            Self::Counter32 => convert_to_counter32(text),
            Self::Counter64 => convert_to_counter64(text),
            Self::Gauge32 => convert_to_gauge32(text),
            Self::Unsigned32 => convert_to_unsigned32(text),
            Self::TimeTicks => convert_to_timeticks(text),
            Self::IpAddress => convert_to_ip_address(text),
        }
    }
}

/// Build the value for `set` from an optional type specifier.
pub fn set_value(value_type: Option<ValueType>, text: &str) -> Result<SetValue> {
    match value_type {
        Some(value_type) => value_type.convert(text).map(SetValue::Typed),
        None => Ok(SetValue::Untyped(untyped_input(text))),
    }
}

fn untyped_input(text: &str) -> ValueInput {
    match text.parse::<i64>() {
        Ok(n) => ValueInput::Integer(n),
        Err(_) => ValueInput::from(text),
    }
}
