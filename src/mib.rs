//! MIB symbol resolution.
//!
//! A small resolver for turning parsed OIDs with symbolic parts into numeric
//! [`Oid`]s, and numeric OIDs back into names for logs. It knows a handful of
//! well-known nodes out of the box; further modules are read from
//! pre-compiled JSON definitions found on the search paths:
//!
//! ```json
//! {
//!   "module": "ACME-MIB",
//!   "oids": {
//!     "1.3.6.1.4.1.99999.1": { "name": "acmeObjects" },
//!     "1.3.6.1.4.1.99999.1.1": { "name": "acmeCounter", "syntax": "Counter32" }
//!   }
//! }
//! ```
//!
//! This is NOT an ASN.1 MIB compiler.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_snmp::Oid;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, OidErrorKind, Result};
use crate::oid::{OidComponent, ParsedOid, Symbol, format_numeric_oid};

/// Built-in nodes: (module, name, arcs, syntax).
static BUILTIN_NODES: &[(&str, &str, &[u32], Option<&str>)] = &[
    // SNMPv2-SMI
    ("SNMPv2-SMI", "iso", &[1], None),
    ("SNMPv2-SMI", "org", &[1, 3], None),
    ("SNMPv2-SMI", "dod", &[1, 3, 6], None),
    ("SNMPv2-SMI", "internet", &[1, 3, 6, 1], None),
    ("SNMPv2-SMI", "directory", &[1, 3, 6, 1, 1], None),
    ("SNMPv2-SMI", "mgmt", &[1, 3, 6, 1, 2], None),
    ("SNMPv2-SMI", "mib-2", &[1, 3, 6, 1, 2, 1], None),
    ("SNMPv2-SMI", "transmission", &[1, 3, 6, 1, 2, 1, 10], None),
    ("SNMPv2-SMI", "experimental", &[1, 3, 6, 1, 3], None),
    ("SNMPv2-SMI", "private", &[1, 3, 6, 1, 4], None),
    ("SNMPv2-SMI", "enterprises", &[1, 3, 6, 1, 4, 1], None),
    ("SNMPv2-SMI", "security", &[1, 3, 6, 1, 5], None),
    ("SNMPv2-SMI", "snmpV2", &[1, 3, 6, 1, 6], None),
    ("SNMPv2-SMI", "snmpModules", &[1, 3, 6, 1, 6, 3], None),
    // SNMPv2-MIB::system
    ("SNMPv2-MIB", "system", &[1, 3, 6, 1, 2, 1, 1], None),
    ("SNMPv2-MIB", "sysDescr", &[1, 3, 6, 1, 2, 1, 1, 1], Some("DisplayString")),
    ("SNMPv2-MIB", "sysObjectID", &[1, 3, 6, 1, 2, 1, 1, 2], Some("OBJECT IDENTIFIER")),
    ("SNMPv2-MIB", "sysUpTime", &[1, 3, 6, 1, 2, 1, 1, 3], Some("TimeTicks")),
    ("SNMPv2-MIB", "sysContact", &[1, 3, 6, 1, 2, 1, 1, 4], Some("DisplayString")),
    ("SNMPv2-MIB", "sysName", &[1, 3, 6, 1, 2, 1, 1, 5], Some("DisplayString")),
    ("SNMPv2-MIB", "sysLocation", &[1, 3, 6, 1, 2, 1, 1, 6], Some("DisplayString")),
    ("SNMPv2-MIB", "sysServices", &[1, 3, 6, 1, 2, 1, 1, 7], Some("INTEGER")),
    ("SNMPv2-MIB", "sysORLastChange", &[1, 3, 6, 1, 2, 1, 1, 8], Some("TimeTicks")),
    // SNMPv2-MIB notifications
    ("SNMPv2-MIB", "snmpMIB", &[1, 3, 6, 1, 6, 3, 1], None),
    ("SNMPv2-MIB", "snmpMIBObjects", &[1, 3, 6, 1, 6, 3, 1, 1], None),
    ("SNMPv2-MIB", "snmpTrap", &[1, 3, 6, 1, 6, 3, 1, 1, 4], None),
    ("SNMPv2-MIB", "snmpTrapOID", &[1, 3, 6, 1, 6, 3, 1, 1, 4, 1], Some("OBJECT IDENTIFIER")),
    ("SNMPv2-MIB", "snmpTrapEnterprise", &[1, 3, 6, 1, 6, 3, 1, 1, 4, 3], Some("OBJECT IDENTIFIER")),
    ("SNMPv2-MIB", "snmpTraps", &[1, 3, 6, 1, 6, 3, 1, 1, 5], None),
    ("SNMPv2-MIB", "coldStart", &[1, 3, 6, 1, 6, 3, 1, 1, 5, 1], None),
    ("SNMPv2-MIB", "warmStart", &[1, 3, 6, 1, 6, 3, 1, 1, 5, 2], None),
    ("SNMPv2-MIB", "authenticationFailure", &[1, 3, 6, 1, 6, 3, 1, 1, 5, 5], None),
    // IF-MIB
    ("IF-MIB", "interfaces", &[1, 3, 6, 1, 2, 1, 2], None),
    ("IF-MIB", "ifNumber", &[1, 3, 6, 1, 2, 1, 2, 1], Some("Integer32")),
    ("IF-MIB", "ifTable", &[1, 3, 6, 1, 2, 1, 2, 2], None),
    ("IF-MIB", "ifEntry", &[1, 3, 6, 1, 2, 1, 2, 2, 1], None),
    ("IF-MIB", "ifIndex", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1], Some("Integer32")),
    ("IF-MIB", "ifDescr", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2], Some("DisplayString")),
    ("IF-MIB", "ifType", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3], Some("INTEGER")),
    ("IF-MIB", "ifMtu", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4], Some("Integer32")),
    ("IF-MIB", "ifSpeed", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5], Some("Gauge32")),
    ("IF-MIB", "ifPhysAddress", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 6], Some("PhysAddress")),
    ("IF-MIB", "ifAdminStatus", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7], Some("INTEGER")),
    ("IF-MIB", "ifOperStatus", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8], Some("INTEGER")),
    ("IF-MIB", "ifLastChange", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 9], Some("TimeTicks")),
    ("IF-MIB", "ifInOctets", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 10], Some("Counter32")),
    ("IF-MIB", "ifOutOctets", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 16], Some("Counter32")),
    ("IF-MIB", "ifXTable", &[1, 3, 6, 1, 2, 1, 31, 1, 1], None),
    ("IF-MIB", "ifXEntry", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1], None),
    ("IF-MIB", "ifName", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1], Some("DisplayString")),
    ("IF-MIB", "ifAlias", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18], Some("DisplayString")),
    ("IF-MIB", "linkDown", &[1, 3, 6, 1, 6, 3, 1, 1, 5, 3], None),
    ("IF-MIB", "linkUp", &[1, 3, 6, 1, 6, 3, 1, 1, 5, 4], None),
];

/// One node of a JSON MIB definition.
#[derive(Debug, Clone, Deserialize)]
pub struct MibNode {
    pub name: String,
    #[serde(default)]
    pub syntax: Option<String>,
}

/// A pre-compiled MIB module as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct MibDefinition {
    pub module: String,
    /// Dotted numeric OID (leading dot optional) to node.
    pub oids: HashMap<String, MibNode>,
}

#[derive(Debug, Clone)]
struct Node {
    module: String,
    name: String,
    syntax: Option<String>,
}

/// Symbol table built from the built-in nodes and loaded modules.
#[derive(Debug, Clone)]
pub struct MibResolver {
    search_paths: Vec<PathBuf>,
    loaded_modules: Vec<String>,
    nodes: BTreeMap<Vec<u32>, Node>,
    /// Node name to every OID carrying it, in load order.
    names: HashMap<String, Vec<Vec<u32>>>,
}

impl Default for MibResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MibResolver {
    /// Create a resolver holding only the built-in nodes.
    pub fn new() -> Self {
        let mut resolver = Self {
            search_paths: Vec::new(),
            loaded_modules: Vec::new(),
            nodes: BTreeMap::new(),
            names: HashMap::new(),
        };
        for &(module, name, arcs, syntax) in BUILTIN_NODES {
            resolver.insert(arcs.to_vec(), module, name, syntax.map(str::to_string));
        }
        resolver
    }

    fn insert(&mut self, arcs: Vec<u32>, module: &str, name: &str, syntax: Option<String>) {
        if !self.loaded_modules.iter().any(|m| m == module) {
            self.loaded_modules.push(module.to_string());
        }
        let owners = self.names.entry(name.to_string()).or_default();
        if !owners.contains(&arcs) {
            owners.push(arcs.clone());
        }
        self.nodes.insert(
            arcs,
            Node {
                module: module.to_string(),
                name: name.to_string(),
                syntax,
            },
        );
    }

    /// Add a directory searched for `<MODULE>.json` definitions.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::MibPathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !self.search_paths.iter().any(|p| p == path) {
            debug!(path = %path.display(), "added MIB search path");
            self.search_paths.push(path.to_path_buf());
        }
        Ok(())
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn loaded_modules(&self) -> &[String] {
        &self.loaded_modules
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        self.loaded_modules.iter().any(|m| m == module)
    }

    /// Load the named modules, or every `*.json` on the search paths when
    /// `names` is empty.
    pub fn preload(&mut self, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return self.load_all();
        }
        for name in names {
            self.load_module(name)?;
        }
        Ok(())
    }

    fn load_all(&mut self) -> Result<()> {
        let mut files = Vec::new();
        for dir in &self.search_paths {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }
        files.sort();
        for path in files {
            self.load_file(&path)?;
        }
        Ok(())
    }

    /// Load one module from the first search path that has it.
    pub fn load_module(&mut self, name: &str) -> Result<()> {
        let file_name = format!("{}.json", name);
        let path = self
            .search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::MibNotFound {
                name: name.to_string(),
            })?;
        self.load_file(&path)
    }

    /// Load a JSON definition file.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let definition: MibDefinition = serde_json::from_str(&content).map_err(|source| Error::MibLoad {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_definition(definition)
    }

    /// Add every node of a definition. Later definitions override earlier
    /// names for the same OID.
    pub fn load_definition(&mut self, definition: MibDefinition) -> Result<()> {
        let count = definition.oids.len();
        for (key, node) in definition.oids {
            let arcs = parse_numeric_key(&key)?;
            self.insert(arcs, &definition.module, &node.name, node.syntax);
        }
        if !self.is_loaded(&definition.module) {
            self.loaded_modules.push(definition.module.clone());
        }
        debug!(module = %definition.module, nodes = count, "loaded MIB module");
        Ok(())
    }

    fn lookup_symbol(&self, symbol: &Symbol) -> Option<&[u32]> {
        let owners = self.names.get(symbol.name())?;
        owners
            .iter()
            .find(|arcs| symbol.module().is_empty() || self.nodes[*arcs].module == symbol.module())
            .map(Vec::as_slice)
    }

    /// Child of `parent` named `name`.
    fn lookup_child(&self, parent: &[u32], name: &str) -> Option<u32> {
        self.names.get(name)?.iter().find_map(|arcs| match arcs.split_last() {
            Some((last, prefix)) if prefix == parent => Some(*last),
            _ => None,
        })
    }

    /// Resolve a parsed OID to numeric form.
    ///
    /// A module-qualified symbol whose module has not been loaded yet is
    /// loaded from the search paths first.
    pub fn resolve(&mut self, oid: &ParsedOid) -> Result<Oid> {
        if let Some(arcs) = oid.as_numeric() {
            return Ok(Oid::from_slice(&arcs));
        }

        let mut arcs = match oid.symbol() {
            None => Vec::new(),
            Some(symbol) => self.resolve_symbol(symbol)?.to_vec(),
        };

        for component in oid.components() {
            match component {
                OidComponent::Number(n) => arcs.push(*n),
                OidComponent::Name(name) => {
                    let arc = self.lookup_child(&arcs, name).ok_or_else(|| Error::UnresolvedSymbol {
                        module: String::new(),
                        name: name.clone(),
                    })?;
                    arcs.push(arc);
                }
            }
        }
        Ok(Oid::from_slice(&arcs))
    }

    fn resolve_symbol(&mut self, symbol: &Symbol) -> Result<&[u32]> {
        let module = symbol.module();
        if self.lookup_symbol(symbol).is_none() && !module.is_empty() && !self.is_loaded(module) {
            match self.load_module(module) {
                Ok(()) | Err(Error::MibNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        self.lookup_symbol(symbol).ok_or_else(|| Error::UnresolvedSymbol {
            module: module.to_string(),
            name: symbol.name().to_string(),
        })
    }

    fn longest_prefix(&self, arcs: &[u32]) -> Option<(usize, &Node)> {
        (1..=arcs.len())
            .rev()
            .find_map(|n| self.nodes.get(&arcs[..n]).map(|node| (n, node)))
    }

    /// Name an OID by its longest known prefix, e.g. `sysDescr.0`.
    ///
    /// Falls back to dotted numeric form when no prefix is known.
    pub fn describe(&self, oid: &Oid) -> String {
        let arcs = oid.arcs();
        match self.longest_prefix(arcs) {
            Some((n, node)) => {
                let mut out = node.name.clone();
                for arc in &arcs[n..] {
                    out.push('.');
                    out.push_str(&arc.to_string());
                }
                out
            }
            None => format_numeric_oid(oid),
        }
    }

    /// SYNTAX of the longest known prefix of an OID.
    pub fn syntax_of(&self, oid: &Oid) -> Option<&str> {
        self.longest_prefix(oid.arcs())
            .and_then(|(_, node)| node.syntax.as_deref())
    }
}

fn parse_numeric_key(key: &str) -> Result<Vec<u32>> {
    let dotted = key.strip_prefix('.').unwrap_or(key);
    if dotted.is_empty() {
        return Err(Error::invalid_oid(key, OidErrorKind::Empty));
    }
    dotted
        .split('.')
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| Error::invalid_oid(key, OidErrorKind::NonNumericArc))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::parse_oid;

    fn resolve(resolver: &mut MibResolver, text: &str) -> Result<Vec<u32>> {
        let parsed = parse_oid(text)?;
        resolver.resolve(&parsed).map(|oid| oid.arcs().to_vec())
    }

    fn temp_mib_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("snmp-keywords-mib-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const ACME_MIB: &str = r#"{
        "module": "ACME-MIB",
        "oids": {
            "1.3.6.1.4.1.99999.1": { "name": "acmeObjects" },
            ".1.3.6.1.4.1.99999.1.1": { "name": "acmeCounter", "syntax": "Counter32" }
        }
    }"#;

    #[test]
    fn test_numeric_passes_through() {
        let mut r = MibResolver::new();
        assert_eq!(resolve(&mut r, ".1.3.6.1.99").unwrap(), vec![1, 3, 6, 1, 99]);
    }

    #[test]
    fn test_builtin_symbols() {
        let mut r = MibResolver::new();
        assert_eq!(
            resolve(&mut r, "SNMPv2-MIB::sysDescr.0").unwrap(),
            vec![1, 3, 6, 1, 2, 1, 1, 1, 0]
        );
        assert_eq!(resolve(&mut r, "sysName.0").unwrap(), vec![1, 3, 6, 1, 2, 1, 1, 5, 0]);
        assert_eq!(
            resolve(&mut r, "IF-MIB::ifDescr.7").unwrap(),
            vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 7]
        );
    }

    #[test]
    fn test_dotted_symbolic_walks_children() {
        let mut r = MibResolver::new();
        assert_eq!(
            resolve(&mut r, ".iso.org.6.internet.2.1.1.1.0").unwrap(),
            vec![1, 3, 6, 1, 2, 1, 1, 1, 0]
        );
        // `org` is not a child of 1.4
        assert!(matches!(
            resolve(&mut r, ".1.4.org").unwrap_err(),
            Error::UnresolvedSymbol { .. }
        ));
    }

    #[test]
    fn test_module_mismatch_is_unresolved() {
        let mut r = MibResolver::new();
        let err = resolve(&mut r, "IF-MIB::sysDescr.0").unwrap_err();
        assert!(matches!(err, Error::UnresolvedSymbol { .. }));
        assert!(err.is_parse());
    }

    #[test]
    fn test_describe_and_syntax() {
        let r = MibResolver::new();
        let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        assert_eq!(r.describe(&oid), "sysDescr.0");
        assert_eq!(r.syntax_of(&oid), Some("DisplayString"));

        let unknown = Oid::from_slice(&[2, 99]);
        assert_eq!(r.describe(&unknown), ".2.99");
        assert_eq!(r.syntax_of(&unknown), None);
    }

    #[test]
    fn test_load_definition() {
        let mut r = MibResolver::new();
        let def: MibDefinition = serde_json::from_str(ACME_MIB).unwrap();
        r.load_definition(def).unwrap();
        assert!(r.is_loaded("ACME-MIB"));
        assert_eq!(
            resolve(&mut r, "ACME-MIB::acmeCounter.0").unwrap(),
            vec![1, 3, 6, 1, 4, 1, 99999, 1, 1, 0]
        );
        let oid = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 99999, 1, 1, 0]);
        assert_eq!(r.syntax_of(&oid), Some("Counter32"));
    }

    #[test]
    fn test_bad_definition_key() {
        let mut r = MibResolver::new();
        let def: MibDefinition =
            serde_json::from_str(r#"{ "module": "X", "oids": { "1.x": { "name": "bad" } } }"#).unwrap();
        assert!(r.load_definition(def).is_err());
    }

    #[test]
    fn test_search_path_must_exist() {
        let mut r = MibResolver::new();
        let err = r.add_search_path("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::MibPathNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "path \"/definitely/not/here\" does not exist"
        );
    }

    #[test]
    fn test_auto_load_from_search_path() {
        let dir = temp_mib_dir("auto");
        std::fs::write(dir.join("ACME-MIB.json"), ACME_MIB).unwrap();

        let mut r = MibResolver::new();
        r.add_search_path(&dir).unwrap();
        assert!(!r.is_loaded("ACME-MIB"));
        assert_eq!(
            resolve(&mut r, "ACME-MIB::acmeObjects.1").unwrap(),
            vec![1, 3, 6, 1, 4, 1, 99999, 1, 1]
        );
        assert!(r.is_loaded("ACME-MIB"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_preload() {
        let dir = temp_mib_dir("preload");
        std::fs::write(dir.join("ACME-MIB.json"), ACME_MIB).unwrap();
        std::fs::write(dir.join("BROKEN-MIB.json"), "{ not json").unwrap();

        let mut r = MibResolver::new();
        r.add_search_path(&dir).unwrap();
        r.preload(&["ACME-MIB"]).unwrap();
        assert!(r.is_loaded("ACME-MIB"));

        assert!(matches!(
            r.preload(&["MISSING-MIB"]).unwrap_err(),
            Error::MibNotFound { .. }
        ));
        assert!(matches!(r.preload(&[]).unwrap_err(), Error::MibLoad { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
