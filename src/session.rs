//! The keyword surface.
//!
//! [`SnmpSession`] owns every piece of state the keywords share: the
//! registry of open connections, the MIB resolver and the named trap
//! filters. Request keywords act on the current connection and fail with
//! [`Error::NoActiveConnection`] before any I/O when there is none.
//!
//! ```rust,no_run
//! use snmp_keywords::prelude::*;
//!
//! # async fn example() -> snmp_keywords::Result<()> {
//! let mut session = SnmpSession::new();
//! session
//!     .open_v2c_connection("192.0.2.1", "public", ConnectionOptions::new().alias("dut"))
//!     .await?;
//!
//! let descr = session.get_display_string("SNMPv2-MIB::system.1", 0u32).await?;
//! let names = session.walk("IF-MIB::ifEntry.2").await?;
//! let idx = find_index(1, &[TableArg::from(&names), TableArg::from("eth0")])?;
//! session.set("IF-MIB::ifEntry.7", 2i64, &idx).await?;
//! # let _ = descr;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

use async_snmp::{Oid, Value, VarBind};
use tracing::{debug, info, instrument};

use crate::connection::{
    Connection, ConnectionCache, ConnectionKey, ConnectionOptions, Credentials, UsmCredentials,
};
use crate::engine::{ConnectRequest, Connector, SnmpEngine, UdpConnector};
use crate::error::{Error, Result};
use crate::index::{Index, IndexInput, index_from_oid, parse_idx};
use crate::mib::MibResolver;
use crate::oid::{OidInput, ParsedOid, format_numeric_oid, parse_oid};
use crate::table::{self, TableArg, WalkEntry};
use crate::trap::{TrapEvent, TrapFilter, TrapWaitOptions, wait_for_trap};
use crate::value::{self, SetValue, ValueInput, convert_untyped, convert_with_syntax, render_value};

/// Keyword session over connections opened by `C`.
pub struct SnmpSession<C: Connector = UdpConnector> {
    connector: C,
    connections: ConnectionCache<Connection<C::Engine>>,
    mib: MibResolver,
    trap_filters: HashMap<String, TrapFilter>,
}

impl SnmpSession<UdpConnector> {
    pub fn new() -> Self {
        Self::with_connector(UdpConnector)
    }
}

impl Default for SnmpSession<UdpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> SnmpSession<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            connections: ConnectionCache::new(),
            mib: MibResolver::new(),
            trap_filters: HashMap::new(),
        }
    }

    pub fn mib(&self) -> &MibResolver {
        &self.mib
    }

    pub fn mib_mut(&mut self) -> &mut MibResolver {
        &mut self.mib
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Open an SNMPv2c connection and make it current. Returns its index.
    #[instrument(skip(self, community))]
    pub async fn open_v2c_connection(
        &mut self,
        host: &str,
        community: &str,
        options: ConnectionOptions,
    ) -> Result<usize> {
        self.open(ConnectRequest {
            host: host.to_string(),
            credentials: Credentials::community(community),
            options,
        })
        .await
    }

    /// Open an SNMPv3 connection and make it current. Returns its index.
    ///
    /// Protocol names are checked before anything is sent.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, password, priv_password))]
    pub async fn open_v3_connection(
        &mut self,
        host: &str,
        user: &str,
        password: Option<&str>,
        priv_password: Option<&str>,
        auth_protocol: Option<&str>,
        priv_protocol: Option<&str>,
        options: ConnectionOptions,
    ) -> Result<usize> {
        let usm = UsmCredentials::new(user, password, priv_password, auth_protocol, priv_protocol)?;
        debug!(level = usm.security_level(), "USM settings");
        self.open(ConnectRequest {
            host: host.to_string(),
            credentials: Credentials::Usm(usm),
            options,
        })
        .await
    }

    async fn open(&mut self, request: ConnectRequest) -> Result<usize> {
        let engine = self.connector.connect(&request).await?;
        let target = request.target();
        let index = self
            .connections
            .register(Connection::new(engine, target.clone()), request.options.alias.as_deref());
        info!(%target, index, "connection opened");
        Ok(index)
    }

    /// Deactivate the current connection. It can be reactivated with
    /// [`switch_connection`](Self::switch_connection).
    pub fn close_connection(&mut self) {
        if let Some(index) = self.connections.close_current() {
            info!(index, "connection closed");
        }
    }

    /// Drop every connection. Indices restart at 1.
    pub fn close_all_connections(&mut self) {
        let closed = self.connections.close_all();
        info!(count = closed.len(), "all connections closed");
    }

    /// Make the connection with this index or alias current.
    ///
    /// Returns the index of the previously current connection.
    #[instrument(skip(self))]
    pub fn switch_connection(&mut self, key: impl Into<ConnectionKey> + Debug) -> Result<Option<usize>> {
        let previous = self.connections.current_index();
        let target = self.connections.switch(key)?.target().to_string();
        info!(%target, index = ?self.connections.current_index(), "switched connection");
        Ok(previous)
    }

    pub fn current_connection_index(&self) -> Option<usize> {
        self.connections.current_index()
    }

    fn active(&self) -> Result<&Connection<C::Engine>> {
        self.connections.current().ok_or(Error::NoActiveConnection)
    }

    fn active_mut(&mut self) -> Result<&mut Connection<C::Engine>> {
        self.connections.current_mut().ok_or(Error::NoActiveConnection)
    }

    // ========================================================================
    // MIBs
    // ========================================================================

    /// Add a directory of JSON MIB definitions.
    pub fn add_mib_search_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "adding MIB path");
        self.mib.add_search_path(path)?;
        debug!(paths = ?self.mib.search_paths(), "new MIB paths");
        Ok(())
    }

    /// Load MIB modules ahead of use; every available module when `names`
    /// is empty.
    pub fn preload_mibs(&mut self, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            info!("preloading all available MIBs");
        } else {
            info!(names = %names.join(" "), "preloading MIBs");
        }
        self.mib.preload(names)
    }

    fn resolve(&mut self, oid: ParsedOid) -> Result<Oid> {
        self.mib.resolve(&oid)
    }

    // ========================================================================
    // GET
    // ========================================================================

    /// GET `oid` with `idx` appended.
    ///
    /// `noSuchObject` and `noSuchInstance` answers fail with
    /// [`Error::ObjectNotFound`].
    #[instrument(skip(self))]
    pub async fn get(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<Value> {
        let vb = self.fetch(oid.into(), idx.into()).await?;
        Ok(vb.value)
    }

    /// GET `oid` with `idx` appended and return it as text.
    ///
    /// Fails with [`Error::NotDisplayString`] unless the agent answered
    /// with an OCTET STRING.
    #[instrument(skip(self))]
    pub async fn get_display_string(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<String> {
        let vb = self.fetch(oid.into(), idx.into()).await?;
        value::display_string(&vb.value).ok_or_else(|| Error::NotDisplayString {
            oid: format_numeric_oid(&vb.oid),
        })
    }

    async fn fetch(&mut self, oid: OidInput, idx: IndexInput) -> Result<VarBind> {
        self.active()?;
        let idx = parse_idx(idx)?;
        let oid = self.resolve(parse_oid(oid)?.with_suffix(idx.arcs()))?;

        let vb = self.active()?.engine().get(&oid).await?;
        if matches!(vb.value, Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView) {
            return Err(Error::ObjectNotFound {
                oid: format_numeric_oid(&vb.oid),
            });
        }

        info!(
            oid = %self.mib.describe(&vb.oid),
            value = %render_value(&vb.value),
            "OID has value"
        );
        Ok(vb)
    }

    // ========================================================================
    // SET
    // ========================================================================

    /// SET `oid` with `idx` appended.
    ///
    /// Untyped values are converted using the MIB syntax of the object when
    /// one is known. Otherwise text is sent as an OCTET STRING and integers
    /// as INTEGER.
    #[instrument(skip(self))]
    pub async fn set(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<SetValue> + Debug,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        self.active()?;
        let idx = parse_idx(idx)?;
        let oid = parse_oid(oid)?.with_suffix(idx.arcs());
        self.store(vec![(oid, value.into())]).await
    }

    /// SET several objects in one request.
    ///
    /// `args` is a flat list of `oid value` groups, each optionally followed
    /// by `idx=N` (default `0`):
    ///
    /// ```text
    /// IF-MIB::ifDescr  "IF1 Description"  idx=1  IF-MIB::ifDescr  "IF2 Description"  idx=2
    /// ```
    #[instrument(skip(self))]
    pub async fn set_many(&mut self, args: &[&str]) -> Result<()> {
        self.active()?;
        let items = parse_set_many_args(args)?
            .into_iter()
            .map(|(oid, value)| (oid, SetValue::Untyped(value)))
            .collect();
        self.store(items).await
    }

    async fn store(&mut self, items: Vec<(ParsedOid, SetValue)>) -> Result<()> {
        let mut varbinds = Vec::with_capacity(items.len());
        for (oid, value) in items {
            let oid = self.resolve(oid)?;
            let value = match value {
                SetValue::Typed(value) => value,
                SetValue::Untyped(input) => self.convert_for(&oid, input)?,
            };
            info!(oid = %self.mib.describe(&oid), value = %render_value(&value), "setting OID");
            varbinds.push((oid, value));
        }

        self.active()?.engine().set_many(&varbinds).await?;
        Ok(())
    }

    fn convert_for(&self, oid: &Oid, input: ValueInput) -> Result<Value> {
        match self.mib.syntax_of(oid) {
            Some(syntax) => convert_with_syntax(syntax, input.clone()).unwrap_or_else(|| convert_untyped(input)),
            None => convert_untyped(input),
        }
    }

    pub async fn set_octet_string(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_octet_string(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_integer(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_integer(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_integer32(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_integer32(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_counter32(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_counter32(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_counter64(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_counter64(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_gauge32(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_gauge32(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_unsigned32(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_unsigned32(value)?;
        self.set(oid, value, idx).await
    }

    pub async fn set_timeticks(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_timeticks(value)?;
        self.set(oid, value, idx).await
    }

    /// SET an IpAddress given as dotted text or four octets.
    pub async fn set_ip_address(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: impl Into<ValueInput>,
        idx: impl Into<IndexInput> + Debug,
    ) -> Result<()> {
        let value = value::convert_to_ip_address(value)?;
        self.set(oid, value, idx).await
    }

    // ========================================================================
    // WALK and table helpers
    // ========================================================================

    /// Walk the subtree under `oid`.
    ///
    /// Each entry holds the instance OID in dotted form and the rendered
    /// value. OID values render with a leading dot.
    #[instrument(skip(self))]
    pub async fn walk(&mut self, oid: impl Into<OidInput> + Debug) -> Result<Vec<WalkEntry>> {
        self.walk_entries(oid.into()).await
    }

    async fn walk_entries(&mut self, oid: OidInput) -> Result<Vec<WalkEntry>> {
        self.active()?;
        info!(%oid, "walk starts");
        let root = self.resolve(parse_oid(oid)?)?;

        let varbinds = self.active()?.engine().walk(&root).await?;
        let entries: Vec<WalkEntry> = varbinds
            .iter()
            .map(|vb| WalkEntry::new(format_numeric_oid(&vb.oid), render_value(&vb.value)))
            .collect();
        for entry in &entries {
            debug!("{}", entry);
        }
        Ok(entries)
    }

    /// Walk `oid` and keep the result on the current connection for
    /// [`find_oid_by_value`](Self::find_oid_by_value).
    #[instrument(skip(self))]
    pub async fn prefetch_oid_table(&mut self, oid: impl Into<OidInput> + Debug) -> Result<()> {
        let oid = oid.into();
        let key = oid.to_string();
        let entries = self.walk_entries(oid).await?;
        self.active_mut()?.store_prefetched(key, entries);
        Ok(())
    }

    /// OID of the first row under `oid` whose value equals `value`.
    ///
    /// Uses the prefetched walk for `oid` when there is one.
    #[instrument(skip(self))]
    pub async fn find_oid_by_value(
        &mut self,
        oid: impl Into<OidInput> + Debug,
        value: &str,
        strip: bool,
    ) -> Result<String> {
        let oid = oid.into();
        let key = oid.to_string();
        if let Some(entries) = self.active()?.prefetched(&key) {
            debug!(%key, "using prefetched table");
            return table::find_oid_by_value(entries, value, strip).map(ToString::to_string);
        }
        let entries = self.walk_entries(oid).await?;
        table::find_oid_by_value(&entries, value, strip).map(ToString::to_string)
    }

    /// See [`table::find_index`].
    pub fn find_index(&self, index_length: usize, args: &[TableArg<'_>]) -> Result<Index> {
        table::find_index(index_length, args)
    }

    /// Trailing `length` arcs of `oid`.
    pub fn get_index_from_oid(&self, oid: impl Into<OidInput>, length: usize) -> Result<Index> {
        index_from_oid(oid, length)
    }

    // ========================================================================
    // Traps
    // ========================================================================

    /// Register a named trap filter on sending host and trap OID.
    ///
    /// Replaces any filter already registered under `name`.
    #[instrument(skip(self))]
    pub fn new_trap_filter(&mut self, name: &str, host: Option<&str>, oid: Option<&str>) -> Result<()> {
        let mut filter = TrapFilter::new();
        if let Some(host) = host {
            filter = filter.host(host);
        }
        if let Some(oid) = oid {
            let oid = self.resolve(parse_oid(oid)?)?;
            filter = filter.trap_oid(oid);
        }
        self.trap_filters.insert(name.to_string(), filter);
        Ok(())
    }

    /// Listen until a trap accepted by the named filter arrives.
    #[instrument(skip(self))]
    pub async fn wait_until_trap_is_received(&self, name: &str, options: &TrapWaitOptions) -> Result<TrapEvent> {
        let filter = self
            .trap_filters
            .get(name)
            .ok_or_else(|| Error::TrapFilterNotFound { name: name.to_string() })?;
        info!(host = %options.host, port = options.port, timeout = ?options.timeout, "waiting for trap");
        wait_for_trap(filter, options).await
    }
}

/// Split flat `oid value [idx=N]` arguments into OID/value pairs.
fn parse_set_many_args(args: &[&str]) -> Result<Vec<(ParsedOid, ValueInput)>> {
    let mut pairs = Vec::new();
    let mut rest = args;

    while let Some((oid, tail)) = rest.split_first() {
        let Some((value, tail)) = tail.split_first() else {
            return Err(Error::invalid_arguments("invalid OID/value(/index) format"));
        };
        let explicit_idx = tail
            .split_first()
            .and_then(|(first, after)| first.strip_prefix("idx=").map(|idx| (idx, after)));
        let (idx, tail) = match explicit_idx {
            Some((idx, after)) => (parse_idx(idx)?, after),
            None => (Index::new([0]), tail),
        };

        pairs.push((parse_oid(*oid)?.with_suffix(idx.arcs()), ValueInput::from(*value)));
        rest = tail;
    }

    if pairs.is_empty() {
        return Err(Error::invalid_arguments("at least one OID/value pair is required"));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::OidComponent;

    #[test]
    fn test_set_many_args_default_index() {
        let pairs = parse_set_many_args(&["sysName", "x", "sysLocation", "y"]);
        // bare symbols need a suffix
        assert!(pairs.is_err());

        let pairs = parse_set_many_args(&[".1.3.6.1.2.1.1.5", "x"]).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, ParsedOid::numeric([1, 3, 6, 1, 2, 1, 1, 5, 0]));
        assert_eq!(pairs[0].1, ValueInput::Text("x".into()));
    }

    #[test]
    fn test_set_many_args_explicit_index() {
        let pairs = parse_set_many_args(&[
            "IF-MIB::ifDescr.1",
            "IF1",
            "idx=1",
            "IF-MIB::ifDescr.1",
            "IF2",
            "idx=2.3",
        ])
        .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs[1].0.components(),
            &[
                OidComponent::Number(1),
                OidComponent::Number(2),
                OidComponent::Number(3)
            ]
        );
    }

    #[test]
    fn test_set_many_args_malformed() {
        assert!(matches!(
            parse_set_many_args(&[]).unwrap_err(),
            Error::InvalidArguments { .. }
        ));
        assert!(matches!(
            parse_set_many_args(&[".1.3.6"]).unwrap_err(),
            Error::InvalidArguments { .. }
        ));
        assert!(parse_set_many_args(&[".1.3.6", "x", "idx=a"]).unwrap_err().is_parse());
    }
}
