#![no_main]

use libfuzzer_sys::fuzz_target;
use sbomkit_pnpm::manifest::{PackageManifest, base_version};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(manifest) = PackageManifest::parse(content, "fuzz/package.json") {
            let _ = manifest.license();
            let _ = manifest.author();
            let _ = manifest.repository_url();
            for (_, specifier, _) in manifest.declared_dependencies(true, true) {
                let _ = base_version(specifier);
            }
        }
    }
});
