//! Fuzz target for the spreadsheet reader.
//!
//! Arbitrary bytes go through content sniffing, the workbook reader and the
//! delimited-text reader. Any outcome other than a panic is acceptable.

#![no_main]

use libfuzzer_sys::fuzz_target;
use noteqa::input::Parser;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok((sheet, meta)) = Parser::new().parse_bytes("fuzz", data) {
        assert_eq!(meta.row_count, sheet.row_count());
        assert!(sheet.rows.iter().all(|row| row.len() == sheet.column_count()));
    }
});
