#![no_main]

use libfuzzer_sys::fuzz_target;
use sbomkit_pnpm::PnpmLockParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = PnpmLockParser;
        if let Ok(graph) = parser.parse(content, "fuzz/pnpm-lock.yaml") {
            // 모든 노드는 자기 키로 다시 조회되어야 함
            for node in graph.nodes() {
                assert!(graph.contains(&node.key));
                for child in node.children(true) {
                    let _ = graph.node(child);
                }
            }
        }
    }
});
