#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_keywords::{index_from_oid, parse_idx};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(index) = parse_idx(s) {
        // Dotted display parses back to the same index
        assert_eq!(parse_idx(index.to_string().as_str()).ok(), Some(index));
    }

    for len in 0..4 {
        let _ = index_from_oid(s, len);
    }
});
