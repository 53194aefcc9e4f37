//! Saved responses and downloads.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use noteqa::input::EXPORT_FILE_STEM;
use noteqa::{ReviewedRecord, SheetFormat};
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// GET /api/saved
pub async fn list_saved(State(state): State<AppState>) -> Json<Vec<ReviewedRecord>> {
    let session = state.session.lock().await;
    Json(session.saved().to_vec())
}

/// Query parameters for an export.
#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<SheetFormat>,
}

/// GET /api/export?format=xlsx
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let format = query.format.unwrap_or(SheetFormat::Xlsx);
    let session = state.session.lock().await;

    if session.saved().is_empty() {
        return Err(ApiError::NotFound(
            "No saved expert responses to export".to_string(),
        ));
    }

    let bytes = session.export_bytes(format)?;
    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        EXPORT_FILE_STEM,
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
