//! Select, approve and save handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use noteqa::{ReviewSession, ReviewState, ReviewedRecord, SessionStatus};
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// The note under review as the form shows it.
#[derive(Serialize)]
pub struct NoteView {
    pub note_id: String,
    pub question: String,
    pub clinical_text: String,
    pub prompt: Option<String>,
    pub generated_response: String,
    pub draft: String,
    pub state: ReviewState,
    pub approved_response: Option<String>,
    pub can_save: bool,
}

impl NoteView {
    /// Snapshot of the current cycle, if a note is selected.
    pub fn current(session: &ReviewSession) -> Option<Self> {
        let record = session.selected()?;
        Some(Self {
            note_id: record.note_id.clone(),
            question: record.question.clone(),
            clinical_text: record.clinical_text.clone(),
            prompt: record.prompt.clone(),
            generated_response: record.generated_response.clone(),
            draft: session.draft().unwrap_or_default().to_string(),
            state: session.state()?,
            approved_response: session.approved_response(&record.note_id).map(String::from),
            can_save: session.can_save(),
        })
    }
}

/// Request body for approving a response.
#[derive(Deserialize)]
pub struct ApproveRequest {
    /// Text to approve; the current draft when absent.
    pub response: Option<String>,
}

/// Response after saving.
#[derive(Serialize)]
pub struct SaveResponse {
    pub saved: ReviewedRecord,
    pub total_saved: usize,
    pub session: SessionStatus,
}

/// POST /api/notes/:id/select
pub async fn select_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    let mut session = state.session.lock().await;
    session.select(&note_id)?;
    current_view(&session)
}

/// POST /api/notes/:id/approve
pub async fn approve_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<NoteView>, ApiError> {
    let mut session = state.session.lock().await;
    ensure_selected(&session, &note_id)?;

    match req.response {
        Some(text) => session.approve_with(text)?,
        None => session.approve()?,
    };

    current_view(&session)
}

/// POST /api/notes/:id/save
///
/// Writes the store file on the blocking pool.
pub async fn save_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<SaveResponse>, ApiError> {
    let session = state.session.clone();

    let response = tokio::task::spawn_blocking(move || -> Result<SaveResponse, ApiError> {
        let mut session = session.blocking_lock();
        ensure_selected(&session, &note_id)?;

        let saved = session.save()?;
        Ok(SaveResponse {
            saved,
            total_saved: session.saved().len(),
            session: session.status(),
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Save task failed: {}", e)))??;

    Ok(Json(response))
}

fn ensure_selected(session: &ReviewSession, note_id: &str) -> Result<(), ApiError> {
    match session.selected_id() {
        Some(id) if id == note_id => Ok(()),
        Some(id) => Err(ApiError::Conflict(format!(
            "Note '{}' is not selected (current: '{}')",
            note_id, id
        ))),
        None => Err(ApiError::Conflict(format!(
            "Note '{}' is not selected",
            note_id
        ))),
    }
}

fn current_view(session: &ReviewSession) -> Result<Json<NoteView>, ApiError> {
    NoteView::current(session)
        .map(Json)
        .ok_or_else(|| ApiError::Internal("No note selected after update".to_string()))
}
