//! Fuzz target for record loading in both modes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use noteqa::generate::StubGenerator;
use noteqa::store::load;
use noteqa::{ColumnSchema, LoadMode};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let schema = ColumnSchema::default();
    let generator = StubGenerator::new();

    for mode in [LoadMode::HasResponse, LoadMode::NeedsGeneration] {
        if let Ok(records) = load(data, mode, &schema, &generator) {
            assert!(records.iter().all(|r| r.note_id.trim() == r.note_id));
        }
    }
});
