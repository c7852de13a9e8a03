#![no_main]

use libfuzzer_sys::fuzz_target;
use sbomkit_pnpm::lockfile::depath::{KeyStyle, classify_reference, parse_dep_path};
use sbomkit_pnpm::store::parse_store_entry;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for major in [5, 6, 9] {
            let _ = parse_dep_path(input, KeyStyle::for_major(major));
        }
        let _ = classify_reference(input);
        let _ = parse_store_entry(input);
    }
});
