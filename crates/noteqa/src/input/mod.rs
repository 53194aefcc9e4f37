//! Spreadsheet input/output and uploaded-file metadata.

mod parser;
mod sheet;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use sheet::{Sheet, SheetFormat};
pub use source::SourceMetadata;
pub use writer::{
    oversized_xlsx_cell, write_sheet, EXPORT_FILE_STEM, EXPORT_SHEET_NAME, XLSX_CELL_LIMIT,
};
