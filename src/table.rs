//! Table row lookup over walk results.
//!
//! Some SNMP tables use arbitrary indices, so the only way to address a row
//! is to walk a few columns and find the row whose cells match. Given
//!
//! | a | b | c | d |
//! |---|---|---|---|
//! | 2 | 2 | 2 | 3 |
//! | 2 | 3 | 2 | 5 |
//!
//! the index of the row where `a == 2` and `b == 3` is what [`find_index`]
//! returns; that index can then be appended to the OID of `d`.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::error::{Error, IndexErrorKind, Result};
use crate::index::{Index, index_suffix};
use crate::oid::{OidInput, parse_oid};

/// One row of a walk: the instance OID and its rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub oid: OidInput,
    pub value: String,
}

impl WalkEntry {
    pub fn new(oid: impl Into<OidInput>, value: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for WalkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.oid, self.value)
    }
}

impl<O: Into<OidInput>, V: Into<String>> From<(O, V)> for WalkEntry {
    fn from((oid, value): (O, V)) -> Self {
        Self::new(oid, value)
    }
}

/// One positional argument of `Find Index`: a column or the value it must match.
#[derive(Debug, Clone, Copy)]
pub enum TableArg<'a> {
    Column(&'a [WalkEntry]),
    Value(&'a str),
}

impl<'a> From<&'a [WalkEntry]> for TableArg<'a> {
    fn from(column: &'a [WalkEntry]) -> Self {
        Self::Column(column)
    }
}

impl<'a> From<&'a Vec<WalkEntry>> for TableArg<'a> {
    fn from(column: &'a Vec<WalkEntry>) -> Self {
        Self::Column(column.as_slice())
    }
}

impl<'a> From<&'a str> for TableArg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Value(value)
    }
}

/// Find the single row index matching every `(column, value)` pair.
///
/// `args` alternates columns and match values. `index_length` is how many
/// trailing arcs of each OID form the index: for `.1.3.6.1.4.1234.1.2.3`
/// and a length of 2 the index is `2.3`.
pub fn find_index(index_length: usize, args: &[TableArg<'_>]) -> Result<Index> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(Error::invalid_arguments(format!(
            "find index needs column/value pairs, got {} argument(s)",
            args.len()
        )));
    }

    let pairs = args
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| match (pair[0], pair[1]) {
            (TableArg::Column(column), TableArg::Value(value)) => Ok((column, value)),
            _ => Err(Error::invalid_arguments(format!(
                "argument pair {} must be a column followed by a value",
                i + 1
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    find_index_pairs(index_length, &pairs)
}

/// [`find_index`] over arguments that are already paired.
pub fn find_index_pairs(index_length: usize, pairs: &[(&[WalkEntry], &str)]) -> Result<Index> {
    if index_length == 0 {
        return Err(Error::invalid_index("0", IndexErrorKind::ZeroLength));
    }
    let Some(((first_column, first_value), rest)) = pairs.split_first() else {
        return Err(Error::invalid_arguments("find index needs at least one column"));
    };

    let mut matches = candidate_indices(index_length, first_column, first_value)?;
    for (column, value) in rest {
        let candidates = candidate_indices(index_length, column, value)?;
        matches.retain(|index| candidates.contains(index));
    }

    debug!(count = matches.len(), "find index intersection");

    let mut iter = matches.into_iter();
    match (iter.next(), iter.len()) {
        (None, _) => Err(Error::NoIndexFound),
        (Some(index), 0) => Ok(index),
        (Some(_), rest) => Err(Error::AmbiguousIndex { count: rest + 1 }),
    }
}

/// Index suffixes of every entry in `column` whose value equals `value`.
fn candidate_indices(index_length: usize, column: &[WalkEntry], value: &str) -> Result<HashSet<Index>> {
    let mut out = HashSet::new();
    for entry in column.iter().filter(|entry| entry.value == value) {
        let oid = parse_oid(entry.oid.clone())?;
        let index = index_suffix(&oid, index_length).ok_or_else(|| {
            Error::invalid_index(entry.oid.to_string(), IndexErrorKind::NotAnInteger)
        })?;
        out.insert(index);
    }
    Ok(out)
}

/// OID of the first entry whose value equals `value`.
///
/// With `strip`, surrounding whitespace of each cell is ignored.
pub fn find_oid_by_value<'a>(column: &'a [WalkEntry], value: &str, strip: bool) -> Result<&'a OidInput> {
    column
        .iter()
        .find(|entry| {
            let cell = if strip { entry.value.trim() } else { entry.value.as_str() };
            cell == value
        })
        .map(|entry| &entry.oid)
        .ok_or_else(|| Error::ValueNotFound {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(rows: &[(&str, &str)]) -> Vec<WalkEntry> {
        rows.iter().map(|&(oid, value)| WalkEntry::new(oid, value)).collect()
    }

    #[test]
    fn test_single_column() {
        let a = column(&[(".1.5.1", "x"), (".1.5.2", "y")]);
        let idx = find_index(1, &[TableArg::from(&a), TableArg::from("y")]).unwrap();
        assert_eq!(idx, Index::new([2]));
    }

    #[test]
    fn test_string_oids_are_parsed() {
        let a = column(&[("IF-MIB::ifDescr.4", "eth0"), ("IF-MIB::ifDescr.5", "eth1")]);
        let idx = find_index_pairs(1, &[(a.as_slice(), "eth1")]).unwrap();
        assert_eq!(idx, Index::new([5]));
    }

    #[test]
    fn test_rejects_misordered_arguments() {
        let a = column(&[(".1.5.1", "x")]);
        let err = find_index(1, &[TableArg::from("x"), TableArg::from(&a)]).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
        let err = find_index(1, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[test]
    fn test_rejects_zero_length() {
        let a = column(&[(".1.5.1", "x")]);
        assert!(find_index_pairs(0, &[(a.as_slice(), "x")]).is_err());
    }

    #[test]
    fn test_symbolic_suffix_is_an_error() {
        let a = column(&[(".iso.org", "x")]);
        assert!(find_index_pairs(1, &[(a.as_slice(), "x")]).unwrap_err().is_parse());
    }

    #[test]
    fn test_duplicate_rows_collapse() {
        // the same row reported twice is still a single index
        let a = column(&[(".1.5.1", "x"), (".1.5.1", "x")]);
        assert_eq!(find_index_pairs(1, &[(a.as_slice(), "x")]).unwrap(), Index::new([1]));
    }

    #[test]
    fn test_find_oid_by_value() {
        let a = column(&[(".1.5.1", " eth0 "), (".1.5.2", "eth1")]);
        assert_eq!(find_oid_by_value(&a, "eth1", false).unwrap().to_string(), ".1.5.2");
        assert!(find_oid_by_value(&a, "eth0", false).is_err());
        assert_eq!(find_oid_by_value(&a, "eth0", true).unwrap().to_string(), ".1.5.1");
        assert!(matches!(
            find_oid_by_value(&a, "eth9", true).unwrap_err(),
            Error::ValueNotFound { .. }
        ));
    }
}
