#![no_main]

use libfuzzer_sys::fuzz_target;
use supar::engine::SortEngine;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes plus the sentinel: inputs with interior sentinels must
    // be rejected cleanly, everything else must sort and validate.
    let mut text = data.to_vec();
    text.push(0);
    if let Ok(mut engine) = SortEngine::with_diag(&text, 1, Box::new(std::io::sink())) {
        if engine.build_sa().is_ok() {
            engine.build_lcp().unwrap();
            assert!(engine.validate());
        }
    }
});
