#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_keywords::{MibResolver, format_oid, parse_oid};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parsed) = parse_oid(s) else {
        return;
    };

    // Numeric OIDs must survive a format/parse round trip
    if let Some(arcs) = parsed.as_numeric() {
        let reparsed = parse_oid(format_oid(&parsed)).expect("formatted OID must parse");
        assert_eq!(reparsed.as_numeric(), Some(arcs));
    }

    // Resolution may fail but must not panic
    let _ = MibResolver::new().resolve(&parsed);
});
