//! Turning uploaded spreadsheets into records.

use tracing::{debug, info};

use crate::error::{NoteQaError, Result};
use crate::generate::ResponseGenerator;
use crate::input::{Parser, Sheet, SourceMetadata};
use crate::schema::{ColumnRole, ColumnSchema, LoadMode};

use super::record::Record;

/// Parse an uploaded file and build its records.
///
/// In [`LoadMode::NeedsGeneration`] any generated-response column in the file
/// is ignored and every row's response comes from `generator`. A generator
/// failure aborts the whole load.
pub fn load(
    bytes: &[u8],
    mode: LoadMode,
    schema: &ColumnSchema,
    generator: &dyn ResponseGenerator,
) -> Result<Vec<Record>> {
    load_with_metadata("upload", bytes, mode, schema, generator).map(|(records, _)| records)
}

/// Like [`load`], also returning metadata about the uploaded file.
pub fn load_with_metadata(
    name: &str,
    bytes: &[u8],
    mode: LoadMode,
    schema: &ColumnSchema,
    generator: &dyn ResponseGenerator,
) -> Result<(Vec<Record>, SourceMetadata)> {
    let (sheet, metadata) = Parser::new().parse_bytes(name, bytes)?;
    let records = load_sheet(&sheet, mode, schema, generator)?;

    info!(
        file = %metadata.file,
        hash = %metadata.hash,
        mode = %mode,
        records = records.len(),
        "loaded records"
    );

    Ok((records, metadata))
}

/// Check that `sheet` has every column the mode requires.
pub fn validate_columns(sheet: &Sheet, mode: LoadMode, schema: &ColumnSchema) -> Result<()> {
    let missing: Vec<&str> = mode
        .required_roles()
        .iter()
        .map(|&role| schema.label(role))
        .filter(|label| !sheet.has_column(label))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(NoteQaError::missing_columns(missing))
    }
}

/// Build records from an already parsed sheet.
pub fn load_sheet(
    sheet: &Sheet,
    mode: LoadMode,
    schema: &ColumnSchema,
    generator: &dyn ResponseGenerator,
) -> Result<Vec<Record>> {
    validate_columns(sheet, mode, schema)?;

    // validate_columns guarantees these lookups succeed.
    let col = |role: ColumnRole| sheet.column_index(schema.label(role));
    let id_col = col(ColumnRole::NoteId);
    let question_col = col(ColumnRole::Question);
    let text_col = col(ColumnRole::ClinicalText);
    let prompt_col = col(ColumnRole::Prompt);
    let response_col = col(ColumnRole::GeneratedResponse);

    let cell = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
    };

    let mut records = Vec::with_capacity(sheet.row_count());

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let note_id = cell(row, id_col).trim().to_string();
        let question = cell(row, question_col);
        let clinical_text = cell(row, text_col);

        let (prompt, generated_response) = match mode {
            LoadMode::HasResponse => (None, cell(row, response_col)),
            LoadMode::NeedsGeneration => {
                let prompt = cell(row, prompt_col);
                let response = generator
                    .generate(&prompt, &clinical_text, &question)
                    .map_err(|e| match e {
                        NoteQaError::Generation(msg) => NoteQaError::Generation(format!(
                            "row {} (note '{}'): {}",
                            row_idx + 1,
                            note_id,
                            msg
                        )),
                        other => other,
                    })?;
                debug!(
                    note_id = %note_id,
                    generator = generator.name(),
                    chars = response.len(),
                    "generated response"
                );
                (Some(prompt), response)
            }
        };

        records.push(Record {
            note_id,
            question,
            clinical_text,
            prompt,
            generated_response,
        });
    }

    Ok(records)
}
