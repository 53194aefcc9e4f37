//! Spreadsheet reader for workbooks and delimited text.

use std::fs;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use tracing::debug;

use super::sheet::{Sheet, SheetFormat};
use super::source::SourceMetadata;
use crate::error::{NoteQaError, Result};

/// Candidate delimiters for text uploads, tab first.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Leading bytes of a ZIP container (xlsx, ods).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Leading bytes of an OLE compound document (legacy xls).
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter for text files (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Stop after this many data rows.
    pub max_rows: Option<usize>,
    /// Quote character for text files.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses spreadsheet files into a [`Sheet`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Auto-detects the delimiter and reads every row.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Sheet, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| NoteQaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.parse_bytes(&name, &contents)
    }

    /// Parse uploaded bytes, detecting the format from their content.
    pub fn parse_bytes(&self, name: &str, bytes: &[u8]) -> Result<(Sheet, SourceMetadata)> {
        let (sheet, format) = if is_workbook(bytes) {
            (self.parse_workbook(bytes)?, SheetFormat::Xlsx)
        } else {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(bytes)?,
            };
            let format = if delimiter == b'\t' {
                SheetFormat::Tsv
            } else {
                SheetFormat::Csv
            };
            (self.parse_delimited(bytes, delimiter)?, format)
        };

        debug!(
            file = name,
            format = %format,
            rows = sheet.row_count(),
            columns = sheet.column_count(),
            "parsed spreadsheet"
        );

        let metadata = SourceMetadata::new(
            name,
            bytes,
            format.extension(),
            sheet.row_count(),
            sheet.column_count(),
        );

        Ok((sheet, metadata))
    }

    /// Read the first worksheet of a workbook.
    fn parse_workbook(&self, bytes: &[u8]) -> Result<Sheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let first = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| NoteQaError::EmptyData("Workbook contains no sheets".to_string()))?;

        let range = workbook.worksheet_range(&first)?;
        let mut cells = range.rows();

        let headers: Vec<String> = cells
            .next()
            .ok_or_else(|| NoteQaError::EmptyData(format!("Sheet '{}' is empty", first)))?
            .iter()
            .map(|c| cell_text(c).trim().to_string())
            .collect();

        let rows = cells.map(|row| row.iter().map(cell_text).collect());
        self.finish(headers, rows)
    }

    /// Read delimited text.
    fn parse_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<Sheet> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.finish(headers, rows.into_iter())
    }

    /// Normalize rows to the header width and drop blank rows.
    fn finish(
        &self,
        headers: Vec<String>,
        rows: impl Iterator<Item = Vec<String>>,
    ) -> Result<Sheet> {
        if headers.iter().all(|h| h.is_empty()) {
            return Err(NoteQaError::EmptyData("No columns found".to_string()));
        }

        let width = headers.len();
        let limit = self.config.max_rows.unwrap_or(usize::MAX);

        let rows = rows
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .take(limit)
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Sheet::new(headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the bytes look like a binary workbook container.
fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}

/// Render a workbook cell as text.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => n.to_string(),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Picks the delimiter from the first non-blank lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let sample: Vec<String> = BufReader::new(bytes)
        .lines()
        .map_while(|line| line.ok())
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    let Some(header) = sample.first() else {
        return Err(NoteQaError::EmptyData("No lines to analyze".to_string()));
    };

    // Long clinical text spans lines inside quotes, so only the header
    // line is trusted for consistency; later lines add a small bonus.
    let best = DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let width = unquoted_count(header, delim);
            if width == 0 {
                return None;
            }
            let agreeing = sample
                .iter()
                .filter(|line| unquoted_count(line, delim) == width)
                .count();
            Some((width * 1000 + agreeing * 10 + usize::from(delim == b'\t'), delim))
        })
        .max_by_key(|&(score, _)| score);

    Ok(best.map_or(b',', |(_, delim)| delim))
}

/// Occurrences of `delimiter` outside double quotes.
fn unquoted_count(line: &str, delimiter: u8) -> usize {
    let target = delimiter as char;
    line.chars()
        .scan(false, |quoted, ch| {
            if ch == '"' {
                *quoted = !*quoted;
            }
            Some(ch == target && !*quoted)
        })
        .filter(|&hit| hit)
        .count()
}
