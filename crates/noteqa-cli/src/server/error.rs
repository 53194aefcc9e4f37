//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use noteqa::NoteQaError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from client.
    BadRequest(String),
    /// Request from a page this server did not serve.
    Forbidden(String),
    /// Action does not match the current review cycle.
    Conflict(String),
    /// Internal server error.
    Internal(String),
    /// Error from the noteqa library.
    NoteQa(NoteQaError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::NoteQa(e) => match e {
                NoteQaError::SchemaValidation { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "schema_validation")
                }
                NoteQaError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence"),
                NoteQaError::Review(_) => (StatusCode::CONFLICT, "review"),
                NoteQaError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation"),
                _ => (StatusCode::BAD_REQUEST, "noteqa_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::NoteQa(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::warn!(error, %message, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<NoteQaError> for ApiError {
    fn from(err: NoteQaError) -> Self {
        ApiError::NoteQa(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::NoteQa(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_errors_map_to_status_codes() {
        let cases = [
            (NoteQaError::missing_columns(["Prompt"]), StatusCode::UNPROCESSABLE_ENTITY),
            (NoteQaError::Persistence("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (NoteQaError::Review("No note selected".into()), StatusCode::CONFLICT),
            (NoteQaError::Generation("timeout".into()), StatusCode::BAD_GATEWAY),
            (NoteQaError::EmptyData("No columns found".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
