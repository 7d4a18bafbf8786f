//! Table index parsing.
//!
//! An index is the trailing suffix of an OID that selects a table row or a
//! scalar instance. Keywords accept it as a dotted string (`"1.2.3"`), a
//! single integer (`6`) or a list of integer-like items (`[1, "2", 3]`).

use std::fmt;

use crate::error::{Error, IndexErrorKind, Result};
use crate::oid::{OidComponent, OidInput, ParsedOid, parse_oid};

/// Ordered sequence of non-negative arcs. Compares and hashes by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(Vec<u32>);

impl Index {
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self(arcs.into_iter().collect())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The only arc of a one-element index.
    pub fn as_single(&self) -> Option<u32> {
        match self.0.as_slice() {
            [arc] => Some(*arc),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

/// Dotted form without a leading dot: `3.261`, or `261` for a single arc.
impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl From<Vec<u32>> for Index {
    fn from(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }
}

impl AsRef<[u32]> for Index {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

/// One item of a list-shaped index argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexItem {
    Number(u32),
    Text(String),
}

impl From<u32> for IndexItem {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for IndexItem {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for IndexItem {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Index argument as accepted by keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexInput {
    /// Dotted string, e.g. `"10.20.30"`.
    Text(String),
    /// Single integer, e.g. `6`.
    Number(u32),
    /// List of integer-like items.
    List(Vec<IndexItem>),
}

/// The scalar instance `.0`.
impl Default for IndexInput {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<&str> for IndexInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for IndexInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<u32> for IndexInput {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl From<Vec<IndexItem>> for IndexInput {
    fn from(items: Vec<IndexItem>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<u32>> for IndexInput {
    fn from(arcs: Vec<u32>) -> Self {
        Self::List(arcs.into_iter().map(IndexItem::Number).collect())
    }
}

impl From<&[u32]> for IndexInput {
    fn from(arcs: &[u32]) -> Self {
        Self::List(arcs.iter().copied().map(IndexItem::Number).collect())
    }
}

impl<const N: usize> From<[u32; N]> for IndexInput {
    fn from(arcs: [u32; N]) -> Self {
        Self::List(arcs.into_iter().map(IndexItem::Number).collect())
    }
}

impl From<&Index> for IndexInput {
    fn from(index: &Index) -> Self {
        Self::from(index.arcs())
    }
}

impl From<Index> for IndexInput {
    fn from(index: Index) -> Self {
        Self::from(index.into_vec())
    }
}

/// Parse an index argument.
pub fn parse_idx(input: impl Into<IndexInput>) -> Result<Index> {
    match input.into() {
        IndexInput::Text(text) => parse_idx_str(&text),
        IndexInput::Number(n) => Ok(Index(vec![n])),
        IndexInput::List(items) => items.iter().map(item_to_arc).collect::<Result<_>>().map(Index),
    }
}

fn parse_idx_str(text: &str) -> Result<Index> {
    if text.is_empty() {
        return Err(Error::invalid_index(text, IndexErrorKind::Empty));
    }
    text.split('.')
        .map(|part| parse_arc(text, part))
        .collect::<Result<_>>()
        .map(Index)
}

fn item_to_arc(item: &IndexItem) -> Result<u32> {
    match item {
        IndexItem::Number(n) => Ok(*n),
        IndexItem::Text(text) => parse_arc(text, text),
    }
}

fn parse_arc(input: &str, part: &str) -> Result<u32> {
    part.trim()
        .parse::<u32>()
        .map_err(|_| Error::invalid_index(input, IndexErrorKind::NotAnInteger))
}

/// Trailing `length` arcs of an OID, as used by `Get Index From OID`.
///
/// A length longer than the OID yields the whole OID. Every returned
/// component must be numeric.
pub fn index_from_oid(oid: impl Into<OidInput>, length: usize) -> Result<Index> {
    let oid = oid.into();
    let parsed = parse_oid(oid.clone())?;
    index_suffix(&parsed, length).ok_or_else(|| {
        if length == 0 {
            Error::invalid_index(oid.to_string(), IndexErrorKind::ZeroLength)
        } else {
            Error::invalid_index(oid.to_string(), IndexErrorKind::NotAnInteger)
        }
    })
}

/// Trailing `length` numeric arcs of a parsed OID, or `None` when the
/// length is zero or the suffix reaches a symbolic part.
pub(crate) fn index_suffix(oid: &ParsedOid, length: usize) -> Option<Index> {
    if length == 0 {
        return None;
    }
    let components = oid.components();
    // A leading symbol counts as an element but can never be part of an index.
    if length > components.len() && oid.symbol().is_some() {
        return None;
    }
    let start = components.len().saturating_sub(length);
    components[start..]
        .iter()
        .map(OidComponent::as_number)
        .collect::<Option<Vec<u32>>>()
        .map(Index)
}
