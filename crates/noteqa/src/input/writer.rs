//! Spreadsheet writer for the persisted store and exports.

use rust_xlsxwriter::{Format, Workbook};

use super::sheet::{Sheet, SheetFormat};
use crate::error::{NoteQaError, Result};

/// Worksheet name used for saved and exported expert responses.
pub const EXPORT_SHEET_NAME: &str = "ExpertResponses";

/// File name stem offered for downloaded exports.
pub const EXPORT_FILE_STEM: &str = "expert_responses";

/// Most characters an xlsx cell can hold.
pub const XLSX_CELL_LIMIT: usize = 32_767;

/// Column width applied to every column in written workbooks.
const COLUMN_WIDTH: f64 = 32.0;

/// Serialize a sheet to bytes in the requested format.
pub fn write_sheet(sheet: &Sheet, format: SheetFormat, sheet_name: &str) -> Result<Vec<u8>> {
    match format.delimiter() {
        None => write_xlsx(sheet, sheet_name),
        Some(delimiter) => write_delimited(sheet, delimiter),
    }
}

/// First cell of `row` too long for an xlsx cell, as `(column, chars)`.
pub fn oversized_xlsx_cell(row: &[String]) -> Option<(usize, usize)> {
    row.iter()
        .map(|cell| cell.chars().count())
        .enumerate()
        .find(|&(_, chars)| chars > XLSX_CELL_LIMIT)
}

fn write_xlsx(sheet: &Sheet, sheet_name: &str) -> Result<Vec<u8>> {
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        if let Some((col, chars)) = oversized_xlsx_cell(row) {
            let column = sheet.headers.get(col).map_or("?", String::as_str);
            return Err(NoteQaError::Spreadsheet(format!(
                "Row {} column '{}' has {} characters; xlsx cells hold at most {}",
                row_idx + 1,
                column,
                chars,
                XLSX_CELL_LIMIT
            )));
        }
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, header, &header_format)?;
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_num, col as u16, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_delimited(sheet: &Sheet, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| NoteQaError::Spreadsheet(format!("Failed to flush CSV writer: {}", e)))
}
