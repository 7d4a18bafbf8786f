//! Common test fixtures and constants.

use snmp_keywords::{Oid, WalkEntry};

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0])
}
pub fn sys_contact() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 4, 0])
}
pub fn sys_name() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 5, 0])
}
pub fn sys_location() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 6, 0])
}

// =============================================================================
// IF-MIB columns (1.3.6.1.2.1.2.2.1.*)
// =============================================================================

pub fn if_descr(index: u32) -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2, index])
}
pub fn if_type(index: u32) -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 3, index])
}
pub fn if_admin_status(index: u32) -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 7, index])
}

// =============================================================================
// Agent credentials
// =============================================================================

pub const COMMUNITY: &str = "public";
pub const AUTH_PASSWORD: &str = "authpass123";
pub const PRIV_PASSWORD: &str = "privpass123";

// =============================================================================
// find_index datasets
// =============================================================================

/// Column where every row from 256 to 268 holds `'1'`.
pub fn column_a() -> Vec<WalkEntry> {
    (256..=268)
        .map(|i| WalkEntry::new([1, 2, 3, i], "1"))
        .collect()
}

/// Port names; 265 and 266 share `'0/10'`, 267 is missing.
pub fn column_b() -> Vec<WalkEntry> {
    [
        (256, "0/1"),
        (257, "0/2"),
        (258, "0/3"),
        (259, "0/4"),
        (260, "0/5"),
        (262, "0/7"),
        (263, "0/8"),
        (264, "0/9"),
        (265, "0/10"),
        (266, "0/10"),
        (261, "0/6"),
        (268, "0/34"),
    ]
    .into_iter()
    .map(|(i, name)| WalkEntry::new([1, 2, 3, i], name))
    .collect()
}
