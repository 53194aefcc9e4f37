//! In-memory string grid for one worksheet.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NoteQaError, Result};

/// Spreadsheet container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    /// Excel workbook (xlsx; xls and ods are readable too).
    Xlsx,
    /// Comma-separated text.
    Csv,
    /// Tab-separated text.
    Tsv,
}

impl SheetFormat {
    /// Determine the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SheetFormat::Xlsx),
            "csv" => Ok(SheetFormat::Csv),
            "tsv" | "tab" => Ok(SheetFormat::Tsv),
            _ => Err(NoteQaError::UnsupportedFormat(format!(
                "'{}' (expected .xlsx, .csv or .tsv)",
                path.display()
            ))),
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "xlsx",
            SheetFormat::Csv => "csv",
            SheetFormat::Tsv => "tsv",
        }
    }

    /// Field delimiter for text formats.
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            SheetFormat::Xlsx => None,
            SheetFormat::Csv => Some(b','),
            SheetFormat::Tsv => Some(b'\t'),
        }
    }

    /// MIME type used for downloads.
    pub fn mime_type(&self) -> &'static str {
        match self {
            SheetFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            SheetFormat::Csv => "text/csv",
            SheetFormat::Tsv => "text/tab-separated-values",
        }
    }
}

impl std::str::FromStr for SheetFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(SheetFormat::Xlsx),
            "csv" => Ok(SheetFormat::Csv),
            "tsv" => Ok(SheetFormat::Tsv),
            _ => Err(format!("Unknown format: {}. Use xlsx, csv, or tsv.", s)),
        }
    }
}

impl std::fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A parsed worksheet: one header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    /// Column headers, trimmed.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order), padded to the header width.
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Create a new sheet.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column with the given header.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Whether a column with the given header exists.
    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SheetFormat::from_path("a/b.xlsx").unwrap(), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::from_path("b.CSV").unwrap(), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path("b.tsv").unwrap(), SheetFormat::Tsv);
        assert!(SheetFormat::from_path("b.json").is_err());
        assert!(SheetFormat::from_path("noext").is_err());
    }

    #[test]
    fn test_column_lookup() {
        let sheet = Sheet::new(
            vec!["Note Id".into(), "Question".into()],
            vec![vec!["N1".into(), "Is X normal?".into()]],
        );
        assert_eq!(sheet.column_index("Question"), Some(1));
        assert!(!sheet.has_column("Prompt"));
        assert_eq!(sheet.get(0, 0), Some("N1"));
        assert_eq!(sheet.get(1, 0), None);
    }
}
