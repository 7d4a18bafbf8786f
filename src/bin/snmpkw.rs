//! snmpkw: run single SNMP keywords from a shell.
//!
//! Part of the snmp-keywords CLI utilities.

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use snmp_keywords::cli::args::{ConnectArgs, MibArgs, OutputArgs, V3Args, ValueType, set_value};
use snmp_keywords::cli::output::{OutputContext, write_error};
use snmp_keywords::trap::{DEFAULT_TRAP_HOST, DEFAULT_TRAP_PORT};
use snmp_keywords::{Error, IndexInput, Result, SnmpSession, TableArg, TrapWaitOptions, WalkEntry};

/// Keyword-style SNMP operations.
#[derive(Debug, Parser)]
#[command(name = "snmpkw", version, about)]
struct Args {
    #[command(flatten)]
    mib: MibArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Command,
}

/// Instance index flags shared by GET and SET.
#[derive(Debug, clap::Args)]
struct IndexArgs {
    /// Index appended to the OID.
    #[arg(long = "idx", default_value = "0")]
    idx: String,

    /// Use the OID as given, without an index.
    #[arg(long = "no-idx", conflicts_with = "idx")]
    no_idx: bool,
}

impl IndexArgs {
    fn input(&self) -> IndexInput {
        if self.no_idx {
            IndexInput::List(Vec::new())
        } else {
            IndexInput::from(self.idx.as_str())
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// GET one value.
    Get {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        #[command(flatten)]
        index: IndexArgs,
        /// OID in any accepted notation.
        oid: String,
    },

    /// GET one OCTET STRING value as text.
    GetString {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        #[command(flatten)]
        index: IndexArgs,
        oid: String,
    },

    /// SET one value.
    Set {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        #[command(flatten)]
        index: IndexArgs,
        /// Value type; taken from the MIB when omitted.
        #[arg(short = 'T', long = "type", value_enum)]
        value_type: Option<ValueType>,
        oid: String,
        value: String,
    },

    /// SET several values in one request: OID VALUE [idx=N] ...
    SetMany {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        #[arg(required = true, value_name = "ARGS", allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Walk a subtree.
    Walk {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        oid: String,
    },

    /// Find the OID of the first row whose value matches.
    FindOid {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        /// Strip surrounding whitespace from walked values before comparing.
        #[arg(long = "strip")]
        strip: bool,
        oid: String,
        value: String,
    },

    /// Find the index of the row matching column values: COLUMN VALUE ...
    FindIndex {
        #[command(flatten)]
        connect: ConnectArgs,
        #[command(flatten)]
        v3: V3Args,
        /// Number of trailing arcs forming the index.
        #[arg(short = 'l', long = "length", default_value = "1")]
        length: usize,
        #[arg(required = true, value_name = "COLUMN VALUE")]
        pairs: Vec<String>,
    },

    /// Wait for an SNMPv2c trap.
    WaitTrap {
        /// Only accept traps sent from this host.
        #[arg(long = "from")]
        from: Option<String>,
        /// Only accept traps with this snmpTrapOID.0.
        #[arg(long = "trap-oid")]
        trap_oid: Option<String>,
        /// Listen address.
        #[arg(long = "listen", default_value = DEFAULT_TRAP_HOST)]
        listen: String,
        /// Listen port.
        #[arg(short = 'p', long = "port", default_value_t = DEFAULT_TRAP_PORT)]
        port: u16,
        /// Seconds to wait.
        #[arg(short = 't', long = "timeout", default_value = "5")]
        timeout: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    args.output.init_tracing();

    let mut session = SnmpSession::new();
    let ctx = OutputContext::new(args.output.format);

    let result = match args.mib.apply(&mut session) {
        Ok(()) => run(&mut session, ctx, args.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(session: &mut SnmpSession, ctx: OutputContext, command: Command) -> Result<()> {
    let mut stdout = io::stdout().lock();

    match command {
        Command::Get {
            connect,
            v3,
            index,
            oid,
        } => {
            connect.open(&v3, session).await?;
            let value = session.get(oid.as_str(), index.input()).await?;
            ctx.write_value(&mut stdout, &oid, &value)?;
        }
        Command::GetString {
            connect,
            v3,
            index,
            oid,
        } => {
            connect.open(&v3, session).await?;
            let text = session.get_display_string(oid.as_str(), index.input()).await?;
            ctx.write_text(&mut stdout, &text)?;
        }
        Command::Set {
            connect,
            v3,
            index,
            value_type,
            oid,
            value,
        } => {
            let value = set_value(value_type, &value)?;
            connect.open(&v3, session).await?;
            session.set(oid.as_str(), value, index.input()).await?;
        }
        Command::SetMany { connect, v3, args } => {
            connect.open(&v3, session).await?;
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            session.set_many(&args).await?;
        }
        Command::Walk { connect, v3, oid } => {
            connect.open(&v3, session).await?;
            let entries = session.walk(oid.as_str()).await?;
            ctx.write_walk(&mut stdout, &entries)?;
        }
        Command::FindOid {
            connect,
            v3,
            strip,
            oid,
            value,
        } => {
            connect.open(&v3, session).await?;
            let found = session.find_oid_by_value(oid.as_str(), &value, strip).await?;
            ctx.write_text(&mut stdout, &found)?;
        }
        Command::FindIndex {
            connect,
            v3,
            length,
            pairs,
        } => {
            connect.open(&v3, session).await?;
            let mut columns: Vec<Vec<WalkEntry>> = Vec::new();
            for column in pairs.iter().step_by(2) {
                columns.push(session.walk(column.as_str()).await?);
            }
            let mut table_args = Vec::with_capacity(pairs.len());
            for (column, value) in columns.iter().zip(pairs.chunks(2)) {
                table_args.push(TableArg::from(column));
                if let Some(value) = value.get(1) {
                    table_args.push(TableArg::from(value.as_str()));
                }
            }
            let index = session.find_index(length, &table_args)?;
            ctx.write_index(&mut stdout, &index)?;
        }
        Command::WaitTrap {
            from,
            trap_oid,
            listen,
            port,
            timeout,
        } => {
            let timeout = Duration::try_from_secs_f64(timeout)
                .map_err(|_| Error::invalid_arguments(format!("invalid timeout: {}", timeout)))?;
            session.new_trap_filter("snmpkw", from.as_deref(), trap_oid.as_deref())?;
            let options = TrapWaitOptions::new().host(listen).port(port).timeout(timeout);
            let event = session.wait_until_trap_is_received("snmpkw", &options).await?;
            ctx.write_trap(&mut stdout, &event, session.mib())?;
        }
    }

    Ok(())
}
