//! Persisted store of reviewed records.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{NoteQaError, Result};
use crate::input::{
    oversized_xlsx_cell, write_sheet, Parser, ParserConfig, Sheet, SheetFormat,
    EXPORT_SHEET_NAME, XLSX_CELL_LIMIT,
};
use crate::schema::{ColumnRole, ColumnSchema};

use super::record::ReviewedRecord;

/// File name used when no store path is configured.
pub const DEFAULT_STORE_FILE: &str = "saved_expert_responses.xlsx";

/// Ordered sequence of reviewed records backed by a spreadsheet file.
///
/// The whole sequence is rewritten on every save. If a write fails the
/// in-memory records keep the new entry, the file keeps its last good
/// contents, and [`is_dirty`](Self::is_dirty) reports the mismatch until a
/// later write succeeds.
#[derive(Debug)]
pub struct PersistedStore {
    path: PathBuf,
    format: SheetFormat,
    schema: ColumnSchema,
    records: Vec<ReviewedRecord>,
    backup_history: bool,
    dirty: bool,
}

impl PersistedStore {
    /// Open the store at `path`, reading any existing records.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first save.
    pub fn open(path: impl AsRef<Path>, schema: ColumnSchema) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format = SheetFormat::from_path(&path)?;

        let records = if path.exists() {
            read_records(&path, format, &schema)?
        } else {
            debug!(path = %path.display(), "no persisted store yet");
            Vec::new()
        };

        info!(
            path = %path.display(),
            records = records.len(),
            "opened persisted store"
        );

        Ok(Self {
            path,
            format,
            schema,
            records,
            backup_history: false,
            dirty: false,
        })
    }

    /// Keep a timestamped copy of the previous file before each rewrite.
    pub fn with_backup_history(mut self, enabled: bool) -> Self {
        self.backup_history = enabled;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column schema used for the stored headers.
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Reviewed records in save order.
    pub fn records(&self) -> &[ReviewedRecord] {
        &self.records
    }

    /// Number of reviewed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records have been saved.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with this identifier has been saved.
    pub fn contains(&self, note_id: &str) -> bool {
        self.records.iter().any(|r| r.note_id() == note_id)
    }

    /// Identifiers of all saved records.
    pub fn reviewed_ids(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.note_id().to_string()).collect()
    }

    /// Whether the last write failed, leaving the file behind memory.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append a record and rewrite the backing file.
    pub fn append_and_persist(&mut self, record: ReviewedRecord) -> Result<()> {
        debug!(note_id = record.note_id(), "appending reviewed record");
        self.check_fits(&record)?;
        self.records.push(record);
        self.persist()
    }

    /// Rewrite the backing file from the in-memory records.
    pub fn persist(&mut self) -> Result<()> {
        match self.write_file() {
            Ok(()) => {
                self.dirty = false;
                info!(
                    path = %self.path.display(),
                    records = self.records.len(),
                    "saved persisted store"
                );
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                warn!(path = %self.path.display(), error = %e, "failed to save persisted store");
                Err(match e {
                    NoteQaError::Persistence(_) => e,
                    other => NoteQaError::Persistence(other.to_string()),
                })
            }
        }
    }

    /// Serialize all records as a downloadable spreadsheet.
    pub fn export_bytes(&self, format: SheetFormat) -> Result<Vec<u8>> {
        write_sheet(&self.to_sheet(), format, EXPORT_SHEET_NAME)
    }

    /// Write all records to `path`, choosing the format from its extension.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.export_bytes(SheetFormat::from_path(path)?)?;

        fs::write(path, bytes).map_err(|e| NoteQaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(path = %path.display(), records = self.records.len(), "exported reviews");
        Ok(())
    }

    /// List backups of this store, newest first.
    pub fn list_history(&self) -> Result<Vec<PathBuf>> {
        let history_dir = history_directory(&self.path);

        if !history_dir.exists() {
            return Ok(Vec::new());
        }

        let ext = self.format.extension();
        let mut entries: Vec<PathBuf> = fs::read_dir(&history_dir)
            .map_err(|e| {
                NoteQaError::Persistence(format!(
                    "Failed to read history directory '{}': {}",
                    history_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == ext))
            .collect();

        // Timestamped names sort chronologically.
        entries.sort_by(|a, b| b.cmp(a));

        Ok(entries)
    }

    /// Rejects a record the xlsx file cannot hold before it enters memory.
    fn check_fits(&self, record: &ReviewedRecord) -> Result<()> {
        if self.format != SheetFormat::Xlsx {
            return Ok(());
        }
        let Some((col, chars)) = oversized_xlsx_cell(&record.to_row()) else {
            return Ok(());
        };
        let column = self.schema.label(ColumnRole::STORED[col]);
        Err(NoteQaError::Persistence(format!(
            "Note '{}' was not saved: '{}' has {} characters but xlsx cells hold at most {}. \
             Use a .csv or .tsv store path for notes this long.",
            record.note_id(),
            column,
            chars,
            XLSX_CELL_LIMIT
        )))
    }

    fn to_sheet(&self) -> Sheet {
        Sheet::new(
            self.schema
                .store_labels()
                .into_iter()
                .map(String::from)
                .collect(),
            self.records.iter().map(ReviewedRecord::to_row).collect(),
        )
    }

    fn write_file(&self) -> Result<()> {
        let bytes = write_sheet(&self.to_sheet(), self.format, EXPORT_SHEET_NAME)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    NoteQaError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        if self.backup_history && self.path.exists() {
            self.backup_current()?;
        }

        // Write beside the target and rename so a failed write never
        // truncates the last good file.
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, &bytes).map_err(|e| {
            NoteQaError::Persistence(format!("Failed to write '{}': {}", tmp.display(), e))
        })?;

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            NoteQaError::Persistence(format!(
                "Failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn backup_current(&self) -> Result<()> {
        let history_dir = history_directory(&self.path);

        fs::create_dir_all(&history_dir).map_err(|e| {
            NoteQaError::Persistence(format!(
                "Failed to create history directory '{}': {}",
                history_dir.display(),
                e
            ))
        })?;

        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
        let backup = history_dir.join(format!("{}.{}", timestamp, self.format.extension()));

        fs::copy(&self.path, &backup).map_err(|e| {
            NoteQaError::Persistence(format!(
                "Failed to back up '{}' to '{}': {}",
                self.path.display(),
                backup.display(),
                e
            ))
        })?;

        debug!(backup = %backup.display(), "backed up persisted store");
        Ok(())
    }
}

/// Read reviewed records from an existing store file.
fn read_records(
    path: &Path,
    format: SheetFormat,
    schema: &ColumnSchema,
) -> Result<Vec<ReviewedRecord>> {
    // Text stores use the delimiter their extension implies.
    let parser = Parser::with_config(ParserConfig {
        delimiter: format.delimiter(),
        ..Default::default()
    });
    let (sheet, _) = parser.parse_file(path).map_err(|e| {
        NoteQaError::Persistence(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    let mut indices = Vec::with_capacity(ColumnRole::STORED.len());
    let mut missing = Vec::new();
    for role in ColumnRole::STORED {
        let label = schema.label(role);
        match sheet.column_index(label) {
            Some(idx) => indices.push(idx),
            None => missing.push(label),
        }
    }

    if !missing.is_empty() {
        return Err(NoteQaError::Persistence(format!(
            "Store file '{}' is missing columns: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut records = Vec::with_capacity(sheet.row_count());
    for row_idx in 0..sheet.row_count() {
        let get = |i: usize| sheet.get(row_idx, indices[i]).unwrap_or_default();

        let note_id = get(0).trim();
        if note_id.is_empty() {
            warn!(path = %path.display(), row = row_idx + 2, "skipping stored row without note id");
            continue;
        }

        records.push(ReviewedRecord::new(note_id, get(1), get(2), get(3)));
    }

    Ok(records)
}

/// Get the history directory for a store file.
pub fn history_directory(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.history", stem))
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!(".{}.tmp", name))
}
