//! Session status, uploads and the unreviewed list.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use noteqa::{ColumnSchema, LoadMode, NoteQaError, SessionStatus, SourceMetadata};
use serde::{Deserialize, Serialize};

use super::review::NoteView;
use crate::server::error::ApiError;
use crate::server::state::{AppState, LOCAL_DATA_WARNING};

/// One entry in the mode selector.
#[derive(Serialize)]
pub struct ModeOption {
    pub value: LoadMode,
    pub label: &'static str,
}

/// Response for GET /api/status.
#[derive(Serialize)]
pub struct StatusResponse {
    pub session: SessionStatus,
    pub progress: f64,
    pub store_path: String,
    pub saved: usize,
    pub dirty: bool,
    pub source: Option<SourceMetadata>,
    pub generator: String,
    pub default_mode: LoadMode,
    pub modes: Vec<ModeOption>,
    pub labels: ColumnSchema,
    pub selected: Option<NoteView>,
    pub warning: &'static str,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.session.lock().await;

    Json(StatusResponse {
        session: session.status(),
        progress: session.progress(),
        store_path: session.store().path().display().to_string(),
        saved: session.saved().len(),
        dirty: session.store().is_dirty(),
        source: session.source().cloned(),
        generator: state.generator.name().to_string(),
        default_mode: state.default_mode,
        modes: [LoadMode::HasResponse, LoadMode::NeedsGeneration]
            .into_iter()
            .map(|mode| ModeOption {
                value: mode,
                label: mode.label(),
            })
            .collect(),
        labels: session.schema().clone(),
        selected: NoteView::current(&session),
        warning: LOCAL_DATA_WARNING,
    })
}

/// Query parameters for an upload.
#[derive(Deserialize)]
pub struct UploadQuery {
    pub mode: Option<LoadMode>,
    pub name: Option<String>,
}

/// Response after loading an uploaded file.
#[derive(Serialize)]
pub struct UploadResponse {
    pub records: usize,
    pub mode: LoadMode,
    pub session: SessionStatus,
    pub source: Option<SourceMetadata>,
}

/// POST /api/upload?mode=…&name=…
///
/// The body is the raw file. Generation runs on the blocking pool.
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Upload body is empty".to_string()));
    }

    let mode = query.mode.unwrap_or(state.default_mode);
    let name = query.name.unwrap_or_else(|| "upload".to_string());
    let session = state.session.clone();
    let generator = state.generator.clone();

    let response = tokio::task::spawn_blocking(move || -> Result<UploadResponse, NoteQaError> {
        let mut session = session.blocking_lock();
        let records = session.load_bytes(&name, &body, mode, generator.as_ref())?;
        Ok(UploadResponse {
            records,
            mode,
            session: session.status(),
            source: session.source().cloned(),
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Upload task failed: {}", e)))??;

    Ok(Json(response))
}

/// Response for GET /api/notes.
#[derive(Serialize)]
pub struct NotesResponse {
    /// Unreviewed note identifiers in file order; duplicates are kept.
    pub notes: Vec<String>,
    pub session: SessionStatus,
}

/// GET /api/notes
pub async fn list_notes(State(state): State<AppState>) -> Json<NotesResponse> {
    let session = state.session.lock().await;

    Json(NotesResponse {
        notes: session
            .unreviewed()
            .iter()
            .map(|r| r.note_id.clone())
            .collect(),
        session: session.status(),
    })
}
