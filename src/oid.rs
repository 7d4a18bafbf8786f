//! OID notation parsing and formatting.
//!
//! Keywords accept OIDs in several human-readable notations:
//!
//! - `SNMPv2-MIB::sysDescr.0` (module-qualified symbol with suffix)
//! - `.1.3.6.1.2.1.1.1.0` (dotted numeric)
//! - `.iso.org.6.internet.2.1.1.1.0` (dotted, mixed symbolic/numeric)
//! - `sysDescr.0` (bare symbol with suffix)
//!
//! [`parse_oid`] turns any of these into a [`ParsedOid`] without consulting a
//! MIB. Turning symbols into numbers is left to
//! [`MibResolver`](crate::mib::MibResolver).
//!
//! # Examples
//!
//! ```
//! use snmp_keywords::oid::{parse_oid, format_oid, OidComponent, ParsedOid};
//!
//! let oid = parse_oid("SNMPv2-MIB::sysDescr.0").unwrap();
//! assert_eq!(oid.symbol().unwrap().module(), "SNMPv2-MIB");
//! assert_eq!(oid.components(), &[OidComponent::Number(0)]);
//!
//! let oid = parse_oid(".1.3.6").unwrap();
//! assert_eq!(format_oid(&oid), ".1.3.6");
//! ```

use std::fmt;

use crate::error::{Error, OidErrorKind, Result};

/// One element of a parsed OID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OidComponent {
    /// Numeric arc.
    Number(u32),
    /// Symbolic name, resolved later against a MIB.
    Name(String),
}

impl OidComponent {
    /// Interpret a component: numeric when it parses as one, symbolic otherwise.
    fn from_text(text: &str) -> Self {
        match text.parse::<u32>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Name(text.to_string()),
        }
    }

    /// The numeric arc, if this component is one.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Name(_) => None,
        }
    }
}

impl fmt::Display for OidComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u32> for OidComponent {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for OidComponent {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// A `(module, name)` MIB symbol. The module is empty for bare symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    module: String,
    name: String,
}

impl Symbol {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.module, self.name)
        }
    }
}

/// Pre-resolution OID: an optional leading symbol followed by components.
///
/// Equality is structural, so two parses of the same notation compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParsedOid {
    symbol: Option<Symbol>,
    components: Vec<OidComponent>,
}

impl ParsedOid {
    /// Build from components with no leading symbol.
    pub fn new(components: impl IntoIterator<Item = OidComponent>) -> Self {
        Self {
            symbol: None,
            components: components.into_iter().collect(),
        }
    }

    /// Build a fully numeric OID.
    pub fn numeric(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self::new(arcs.into_iter().map(OidComponent::Number))
    }

    /// Build a symbol-led OID such as `SNMPv2-MIB::sysDescr.0`.
    pub fn with_symbol(symbol: Symbol, suffix: impl IntoIterator<Item = OidComponent>) -> Self {
        Self {
            symbol: Some(symbol),
            components: suffix.into_iter().collect(),
        }
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Components after the leading symbol (or all components if none).
    pub fn components(&self) -> &[OidComponent] {
        &self.components
    }

    /// Number of elements, counting a leading symbol as one.
    pub fn len(&self) -> usize {
        self.components.len() + usize::from(self.symbol.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All arcs if the OID has no symbolic parts.
    pub fn as_numeric(&self) -> Option<Vec<u32>> {
        if self.symbol.is_some() {
            return None;
        }
        self.components.iter().map(OidComponent::as_number).collect()
    }

    /// Append index arcs, as keywords do with their `idx` argument.
    pub fn with_suffix(&self, arcs: &[u32]) -> Self {
        let mut out = self.clone();
        out.components
            .extend(arcs.iter().copied().map(OidComponent::Number));
        out
    }
}

impl fmt::Display for ParsedOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = &self.symbol {
            write!(f, ".{}", symbol)?;
        }
        for component in &self.components {
            write!(f, ".{}", component)?;
        }
        Ok(())
    }
}

/// OID argument as accepted by keywords: text notation or already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OidInput {
    Text(String),
    Parsed(ParsedOid),
}

impl fmt::Display for OidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Parsed(oid) => oid.fmt(f),
        }
    }
}

impl From<&str> for OidInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for OidInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for OidInput {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<ParsedOid> for OidInput {
    fn from(oid: ParsedOid) -> Self {
        Self::Parsed(oid)
    }
}

impl From<&[u32]> for OidInput {
    fn from(arcs: &[u32]) -> Self {
        Self::Parsed(ParsedOid::numeric(arcs.iter().copied()))
    }
}

impl<const N: usize> From<[u32; N]> for OidInput {
    fn from(arcs: [u32; N]) -> Self {
        Self::Parsed(ParsedOid::numeric(arcs))
    }
}

impl From<&async_snmp::Oid> for OidInput {
    fn from(oid: &async_snmp::Oid) -> Self {
        Self::Parsed(ParsedOid::numeric(oid.arcs().iter().copied()))
    }
}

/// Parse an OID argument into its pre-resolution form.
///
/// Parsed input is passed through unchanged.
pub fn parse_oid(input: impl Into<OidInput>) -> Result<ParsedOid> {
    match input.into() {
        OidInput::Parsed(oid) => Ok(oid),
        OidInput::Text(text) => parse_oid_str(&text),
    }
}

/// Parse a textual OID notation.
pub fn parse_oid_str(text: &str) -> Result<ParsedOid> {
    if text.is_empty() {
        return Err(Error::invalid_oid(text, OidErrorKind::Empty));
    }

    if let Some((module, symbol)) = text.split_once("::") {
        return parse_symbolic(text, module, symbol);
    }

    if let Some(dotted) = text.strip_prefix('.') {
        let components = split_components(text, dotted)?;
        return Ok(ParsedOid::new(components));
    }

    parse_symbolic(text, "", text)
}

/// `symbol.suffix` with an explicit (possibly empty) module.
fn parse_symbolic(input: &str, module: &str, symbol: &str) -> Result<ParsedOid> {
    // A suffix is mandatory: `sysDescr` alone is rejected rather than
    // silently becoming `sysDescr.0`.
    let (name, suffix) = symbol
        .split_once('.')
        .ok_or_else(|| Error::invalid_oid(input, OidErrorKind::MissingSuffix))?;

    if name.is_empty() {
        return Err(Error::invalid_oid(input, OidErrorKind::EmptySymbol));
    }

    let components = split_components(input, suffix)?;
    Ok(ParsedOid::with_symbol(Symbol::new(module, name), components))
}

fn split_components(input: &str, dotted: &str) -> Result<Vec<OidComponent>> {
    dotted
        .split('.')
        .map(|part| {
            if part.is_empty() {
                Err(Error::invalid_oid(input, OidErrorKind::EmptyComponent))
            } else {
                Ok(OidComponent::from_text(part))
            }
        })
        .collect()
}

/// Render a parsed OID with a leading dot.
///
/// Symbolic parts render as their names; a leading symbol renders as
/// `MODULE::name`, or just `name` when the module is empty.
pub fn format_oid(oid: &ParsedOid) -> String {
    oid.to_string()
}

/// Render an engine OID with a leading dot, e.g. `.1.3.6.1.2.1.1.1.0`.
pub fn format_numeric_oid(oid: &async_snmp::Oid) -> String {
    let mut out = String::with_capacity(oid.arcs().len() * 4);
    for arc in oid.arcs() {
        out.push('.');
        out.push_str(&arc.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> OidComponent {
        OidComponent::Name(s.to_string())
    }

    #[test]
    fn test_parse_dotted_numeric() {
        let oid = parse_oid(".1.2.3").unwrap();
        assert_eq!(oid, ParsedOid::numeric([1, 2, 3]));
        assert_eq!(oid.as_numeric(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_parse_bare_symbol() {
        let oid = parse_oid("sysDescr.0").unwrap();
        assert_eq!(
            oid,
            ParsedOid::with_symbol(Symbol::new("", "sysDescr"), [OidComponent::Number(0)])
        );
        assert_eq!(oid.len(), 2);
    }

    #[test]
    fn test_parse_module_symbol() {
        let oid = parse_oid("SNMPv2-MIB::sysDescr.0").unwrap();
        assert_eq!(
            oid,
            ParsedOid::with_symbol(
                Symbol::new("SNMPv2-MIB", "sysDescr"),
                [OidComponent::Number(0)]
            )
        );
    }

    #[test]
    fn test_parse_dotted_symbolic() {
        let oid = parse_oid(".iso.org.6").unwrap();
        assert_eq!(
            oid,
            ParsedOid::new([name("iso"), name("org"), OidComponent::Number(6)])
        );
        assert_eq!(oid.as_numeric(), None);
    }

    #[test]
    fn test_parse_symbol_with_multi_arc_suffix() {
        let oid = parse_oid("IF-MIB::ifDescr.1.2").unwrap();
        assert_eq!(
            oid.components(),
            &[OidComponent::Number(1), OidComponent::Number(2)]
        );
    }

    #[test]
    fn test_only_first_double_colon_splits() {
        let oid = parse_oid("A::b.c::d").unwrap();
        assert_eq!(oid.symbol().unwrap().module(), "A");
        assert_eq!(oid.symbol().unwrap().name(), "b");
        assert_eq!(oid.components(), &[name("c::d")]);
    }

    #[test]
    fn test_parsed_input_passes_through() {
        let parsed = ParsedOid::new([OidComponent::Number(1), name("x")]);
        assert_eq!(parse_oid(parsed.clone()).unwrap(), parsed);
        assert_eq!(
            parse_oid([1u32, 3, 6]).unwrap(),
            ParsedOid::numeric([1, 3, 6])
        );
    }

    #[test]
    fn test_parse_rejects_bare_symbol_without_suffix() {
        let err = parse_oid("sysDescr").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::MissingSuffix,
                ..
            }
        ));
        assert!(parse_oid("SNMPv2-MIB::sysDescr").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_oid("").unwrap_err(),
            Error::InvalidOid {
                kind: OidErrorKind::Empty,
                ..
            }
        ));
        assert!(parse_oid(".").is_err());
        assert!(parse_oid(".1..2").is_err());
        assert!(parse_oid(".1.2.").is_err());
        assert!(parse_oid("sysDescr.").is_err());
        assert!(parse_oid(".sysDescr").is_ok());
        assert!(parse_oid("MIB::.0").is_err());
    }

    #[test]
    fn test_format_oid() {
        assert_eq!(format_oid(&ParsedOid::numeric([1, 2, 3])), ".1.2.3");
        let mixed = ParsedOid::new([
            OidComponent::Number(1),
            name("iso"),
            name("org"),
            OidComponent::Number(3),
        ]);
        assert_eq!(format_oid(&mixed), ".1.iso.org.3");
    }

    #[test]
    fn test_format_symbol() {
        let oid = parse_oid("SNMPv2-MIB::sysDescr.0").unwrap();
        assert_eq!(format_oid(&oid), ".SNMPv2-MIB::sysDescr.0");
        let oid = parse_oid("sysDescr.0").unwrap();
        assert_eq!(format_oid(&oid), ".sysDescr.0");
    }

    #[test]
    fn test_format_numeric_oid() {
        let oid = async_snmp::Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        assert_eq!(format_numeric_oid(&oid), ".1.3.6.1.2.1.1.1.0");
    }

    #[test]
    fn test_with_suffix() {
        let oid = parse_oid("ifDescr.1").unwrap().with_suffix(&[0]);
        assert_eq!(
            oid.components(),
            &[OidComponent::Number(1), OidComponent::Number(0)]
        );
    }
}
