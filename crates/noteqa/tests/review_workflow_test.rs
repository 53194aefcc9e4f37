//! Integration tests for the review workflow.

use std::fs;
use std::path::Path;

use calamine::Reader;
use noteqa::generate::{ResponseGenerator, StubGenerator, STUB_RESPONSE};
use noteqa::input::{write_sheet, Parser, Sheet, EXPORT_SHEET_NAME};
use noteqa::store::{load, PersistedStore};
use noteqa::{
    ColumnSchema, LoadMode, NoteQaError, ReviewConfig, ReviewSession, ReviewState, SessionStatus,
    SheetFormat,
};

/// Build an xlsx upload from a header row and data rows.
fn xlsx(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let sheet = Sheet::new(
        headers.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect(),
    );
    write_sheet(&sheet, SheetFormat::Xlsx, "Sheet1").expect("Failed to build workbook")
}

fn has_response_upload() -> Vec<u8> {
    xlsx(
        &["Note Id", "Question", "Discharge Summary", "LLM-generated Response"],
        &[
            &["N1", "Is X normal?", "...", "Yes"],
            &["N2", "Any allergies?", "NKDA.", "None known"],
            &["N3", "Discharge medications?", "Aspirin 81mg daily.", "Aspirin"],
        ],
    )
}

fn open_session(dir: &Path) -> ReviewSession {
    ReviewSession::open(dir.join("saved_expert_responses.xlsx"), ColumnSchema::default())
        .expect("Failed to open session")
}

fn pending_ids(session: &ReviewSession) -> Vec<String> {
    session
        .unreviewed()
        .iter()
        .map(|r| r.note_id.clone())
        .collect()
}

/// Echoes its inputs so tests can check which row produced a response.
struct EchoGenerator;

impl ResponseGenerator for EchoGenerator {
    fn generate(&self, prompt: &str, clinical_text: &str, question: &str) -> noteqa::Result<String> {
        Ok(format!("[{}] {} / {}", prompt, question, clinical_text))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[test]
fn test_approve_unedited_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());

    let bytes = xlsx(
        &["Note Id", "Question", "Discharge Summary", "LLM-generated Response"],
        &[&["N1", "Is X normal?", "...", "Yes"]],
    );
    let count = session
        .load_bytes("notes.xlsx", &bytes, LoadMode::HasResponse, &StubGenerator::new())
        .unwrap();
    assert_eq!(count, 1);

    session.select("N1").unwrap();
    session.approve().unwrap();
    session.save().unwrap();

    let (sheet, _) = Parser::new()
        .parse_file(dir.path().join("saved_expert_responses.xlsx"))
        .unwrap();
    assert_eq!(
        sheet.headers,
        vec!["Note Id", "Question", "Discharge Summary", "Expert's Response"]
    );
    assert_eq!(sheet.rows, vec![vec!["N1", "Is X normal?", "...", "Yes"]]);
    assert_eq!(session.status(), SessionStatus::Complete { reviewed: 1 });
}

#[test]
fn test_generation_mode_fills_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());

    let bytes = xlsx(
        &["Note Id", "Question", "Discharge Summary", "Prompt"],
        &[
            &["N1", "Q1", "Text one", "Answer briefly."],
            &["N2", "Q2", "Text two", "Answer in one word."],
        ],
    );
    session
        .load_bytes("notes.xlsx", &bytes, LoadMode::NeedsGeneration, &StubGenerator::new())
        .unwrap();

    assert_eq!(session.records().len(), 2);
    for record in session.records() {
        assert!(!record.generated_response.is_empty());
        assert_eq!(record.generated_response, STUB_RESPONSE);
    }
}

#[test]
fn test_generation_ignores_existing_response_column() {
    let bytes = xlsx(
        &[
            "Note Id",
            "Question",
            "Discharge Summary",
            "Prompt",
            "LLM-generated Response",
        ],
        &[&["N1", "Q1", "Text one", "P1", "stale answer"]],
    );

    let records = load(
        &bytes,
        LoadMode::NeedsGeneration,
        &ColumnSchema::default(),
        &EchoGenerator,
    )
    .unwrap();

    assert_eq!(records[0].generated_response, "[P1] Q1 / Text one");
}

#[test]
fn test_all_reviewed_upload_reports_completion() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("saved_expert_responses.xlsx");

    {
        let mut session = open_session(dir.path());
        session
            .load_bytes(
                "notes.xlsx",
                &has_response_upload(),
                LoadMode::HasResponse,
                &StubGenerator::new(),
            )
            .unwrap();
        for id in ["N1", "N2", "N3"] {
            session.select(id).unwrap();
            session.approve().unwrap();
            session.save().unwrap();
        }
    }

    // A new run reloads reviewed ids from the file.
    let mut session = ReviewSession::open(&store_path, ColumnSchema::default()).unwrap();
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();

    assert!(session.is_complete());
    assert!(session.unreviewed().is_empty());
    assert!(matches!(
        session.select("N2"),
        Err(NoteQaError::Review(ref msg)) if msg.contains("All notes have been reviewed")
    ));
}

// =============================================================================
// Workflow rules
// =============================================================================

#[test]
fn test_missing_columns_leave_session_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();

    let bad = xlsx(&["Note Id", "Question"], &[&["N9", "Q"]]);
    let err = session
        .load_bytes("bad.xlsx", &bad, LoadMode::HasResponse, &StubGenerator::new())
        .unwrap_err();

    match err {
        NoteQaError::SchemaValidation { missing } => {
            assert_eq!(missing, vec!["Discharge Summary", "LLM-generated Response"]);
        }
        other => panic!("expected schema validation error, got {other:?}"),
    }
    assert_eq!(pending_ids(&session), vec!["N1", "N2", "N3"]);
}

#[test]
fn test_save_blocked_until_approved() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();

    session.select("N2").unwrap();
    session.edit("No known drug allergies").unwrap();
    assert!(!session.can_save());
    assert!(session.save().is_err());
    assert!(!dir.path().join("saved_expert_responses.xlsx").exists());

    session.approve().unwrap();
    let saved = session.save().unwrap();
    assert_eq!(saved.expert_response(), "No known drug allergies");
    assert_eq!(session.state(), Some(ReviewState::Saved));
    assert_eq!(pending_ids(&session), vec!["N1", "N3"]);
}

#[test]
fn test_edit_never_touches_uploaded_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();

    session.select("N1").unwrap();
    session.approve_with("Yes, within normal limits").unwrap();
    session.save().unwrap();

    assert_eq!(session.records()[0].generated_response, "Yes");
    assert_eq!(session.saved()[0].expert_response(), "Yes, within normal limits");
}

#[test]
fn test_duplicate_ids_both_listed_until_saved() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());

    let bytes = xlsx(
        &["Note Id", "Question", "Discharge Summary", "LLM-generated Response"],
        &[
            &["N1", "First question", "T", "A"],
            &["N2", "Q", "T", "B"],
            &["N1", "Second question", "T", "C"],
        ],
    );
    session
        .load_bytes("notes.xlsx", &bytes, LoadMode::HasResponse, &StubGenerator::new())
        .unwrap();
    assert_eq!(pending_ids(&session), vec!["N1", "N2", "N1"]);

    // The first matching row is the one reviewed.
    let record = session.select("N1").unwrap();
    assert_eq!(record.question, "First question");
    session.approve().unwrap();
    session.save().unwrap();

    assert_eq!(pending_ids(&session), vec!["N2"]);
}

#[test]
fn test_reload_continues_from_file() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut session = open_session(dir.path());
        session
            .load_bytes(
                "notes.xlsx",
                &has_response_upload(),
                LoadMode::HasResponse,
                &StubGenerator::new(),
            )
            .unwrap();
        session.select("N3").unwrap();
        session.approve_with("Aspirin 81mg").unwrap();
        session.save().unwrap();

        // Approved but never saved; lost at exit.
        session.select("N1").unwrap();
        session.approve().unwrap();
    }

    let mut session = open_session(dir.path());
    assert_eq!(session.saved().len(), 1);
    assert_eq!(session.saved()[0].note_id(), "N3");
    assert_eq!(session.status(), SessionStatus::NoRecords);

    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();
    assert_eq!(pending_ids(&session), vec!["N1", "N2"]);
    assert_eq!(session.approved_response("N1"), None);
    assert_eq!(
        session.status(),
        SessionStatus::InProgress {
            remaining: 2,
            reviewed: 1
        }
    );
}

#[test]
fn test_failed_save_keeps_approval_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("saved_expert_responses.xlsx");
    let mut session = ReviewSession::open(&store_path, ColumnSchema::default()).unwrap();
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();

    // Occupy the store path with a directory so the rename fails.
    fs::create_dir(&store_path).unwrap();

    session.select("N1").unwrap();
    session.approve_with("Yes").unwrap();
    let err = session.save().unwrap_err();
    assert!(err.is_persistence());
    assert!(session.store().is_dirty());
    assert_eq!(session.approved_response("N1"), Some("Yes"));
    assert!(session.can_save());

    fs::remove_dir(&store_path).unwrap();
    session.save().unwrap();

    assert!(!session.store().is_dirty());
    assert_eq!(session.saved().len(), 1);

    let reopened = PersistedStore::open(&store_path, ColumnSchema::default()).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.records()[0].expert_response(), "Yes");
}

#[test]
fn test_overlong_note_does_not_block_other_saves() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());

    let long = "Hospital course. ".repeat(2_500);
    let sheet = Sheet::new(
        vec![
            "Note Id".into(),
            "Question".into(),
            "Discharge Summary".into(),
            "LLM-generated Response".into(),
        ],
        vec![
            vec!["N1".into(), "Summary?".into(), long, "Long stay".into()],
            vec!["N2".into(), "Allergies?".into(), "NKDA.".into(), "None".into()],
        ],
    );
    let bytes = write_sheet(&sheet, SheetFormat::Csv, EXPORT_SHEET_NAME).unwrap();
    session
        .load_bytes("notes.csv", &bytes, LoadMode::HasResponse, &StubGenerator::new())
        .unwrap();

    session.select("N1").unwrap();
    session.approve().unwrap();
    let err = session.save().unwrap_err();
    assert!(err.is_persistence());
    assert!(!session.store().is_dirty());
    assert_eq!(session.state(), Some(ReviewState::Approved));

    session.select("N2").unwrap();
    session.approve().unwrap();
    session.save().unwrap();

    let reopened = PersistedStore::open(
        dir.path().join("saved_expert_responses.xlsx"),
        ColumnSchema::default(),
    )
    .unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.contains("N2"));
    assert_eq!(pending_ids(&session), vec!["N1"]);
}

#[test]
fn test_reselecting_approved_note_restores_approved_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();

    session.select("N1").unwrap();
    session.edit("Yes, within normal limits").unwrap();
    session.approve().unwrap();

    session.select("N2").unwrap();
    session.select("N1").unwrap();

    assert_eq!(session.state(), Some(ReviewState::Approved));
    assert_eq!(session.draft(), Some("Yes, within normal limits"));
    assert_eq!(
        session.approved_response("N1"),
        Some("Yes, within normal limits")
    );
}

// =============================================================================
// Export and configuration
// =============================================================================

#[test]
fn test_export_has_single_named_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());
    session
        .load_bytes(
            "notes.xlsx",
            &has_response_upload(),
            LoadMode::HasResponse,
            &StubGenerator::new(),
        )
        .unwrap();
    for id in ["N2", "N1"] {
        session.select(id).unwrap();
        session.approve().unwrap();
        session.save().unwrap();
    }

    let bytes = session.export_bytes(SheetFormat::Xlsx).unwrap();
    let workbook =
        calamine::open_workbook_auto_from_rs(std::io::Cursor::new(bytes.as_slice())).unwrap();
    assert_eq!(workbook.sheet_names(), vec![EXPORT_SHEET_NAME.to_string()]);

    let (sheet, _) = Parser::new().parse_bytes("export.xlsx", &bytes).unwrap();
    let ids: Vec<&str> = sheet.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["N2", "N1"]);

    let csv_path = dir.path().join("export.csv");
    session.export_to(&csv_path).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("Note Id,Question,Discharge Summary,Expert's Response"));
}

#[test]
fn test_config_schema_drives_labels() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReviewConfig::from_toml_str(&format!(
        r#"
        store_path = "{}"

        [columns]
        preset = "clinical-text"
        "#,
        dir.path().join("reviews.xlsx").display()
    ))
    .unwrap();

    let mut session = config.open_session().unwrap();
    let bytes = xlsx(
        &["Note Id", "Question", "Clinical Text", "LLM-generated Response"],
        &[&["E1", "Q", "Radiology report", "Normal"]],
    );
    session
        .load_bytes("notes.xlsx", &bytes, LoadMode::HasResponse, &StubGenerator::new())
        .unwrap();
    session.select("E1").unwrap();
    session.approve().unwrap();
    session.save().unwrap();

    let (sheet, _) = Parser::new()
        .parse_file(dir.path().join("reviews.xlsx"))
        .unwrap();
    assert_eq!(sheet.headers[2], "Clinical Text");
}
