//! Axum application setup.

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use super::error::ApiError;
use super::handlers;
use super::state::AppState;
use crate::web::static_handler;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Whether `origin` is the form this server serves on `port`.
fn is_local_origin(origin: &HeaderValue, port: u16) -> bool {
    origin.to_str().is_ok_and(|origin| {
        origin == format!("http://localhost:{}", port)
            || origin == format!("http://127.0.0.1:{}", port)
    })
}

/// Rejects requests whose `Origin` is not the local form.
async fn reject_foreign_origin(State(port): State<u16>, request: Request, next: Next) -> Response {
    match request.headers().get(header::ORIGIN) {
        Some(origin) if !is_local_origin(origin, port) => {
            warn!(?origin, uri = %request.uri(), "rejected cross-origin request");
            ApiError::Forbidden("Cross-origin requests are not allowed".to_string())
                .into_response()
        }
        _ => next.run(request).await,
    }
}

/// Create the Axum router for a server listening on `port`.
pub fn create_router(state: AppState, port: u16) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            is_local_origin(origin, port)
        }))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // Session
        .route("/status", get(handlers::get_status))
        .route("/upload", post(handlers::upload))
        .route("/notes", get(handlers::list_notes))
        // Review cycle
        .route("/notes/:id/select", post(handlers::select_note))
        .route("/notes/:id/approve", post(handlers::approve_note))
        .route("/notes/:id/save", post(handlers::save_note))
        // Saved responses
        .route("/saved", get(handlers::list_saved))
        .route("/export", get(handlers::export))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .nest("/api", api_routes)
        .fallback(static_handler)
        .layer(middleware::from_fn_with_state(port, reject_foreign_origin))
        .layer(cors)
        .with_state(state)
}

/// Start the web server and run until Ctrl+C.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state, port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "review server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use noteqa::generate::StubGenerator;
    use noteqa::{ColumnSchema, LoadMode, ReviewSession};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const UPLOAD: &str = "Note Id,Question,Discharge Summary,LLM-generated Response\n\
N1,Is X normal?,...,Yes\n\
N2,Any allergies?,NKDA.,None known\n";

    const PORT: u16 = 3141;

    fn router(dir: &tempfile::TempDir) -> Router {
        let session =
            ReviewSession::open(dir.path().join("store.xlsx"), ColumnSchema::default()).unwrap();
        let state = AppState::new(session, Arc::new(StubGenerator::new()), LoadMode::HasResponse);
        create_router(state, PORT)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post(uri: &str, body: Body) -> Request<Body> {
        Request::post(uri).body(body).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn upload(app: &Router) {
        let (status, body) = send_json(
            app,
            post("/api/upload?mode=has_response&name=notes.csv", Body::from(UPLOAD)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 2);
    }

    #[tokio::test]
    async fn test_status_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);

        let (status, body) = send_json(&app, get("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["status"], "no_records");
        assert_eq!(body["modes"][1]["label"], "Needs LLM to generate Response");
        assert_eq!(body["labels"]["clinical_text"], "Discharge Summary");
    }

    #[tokio::test]
    async fn test_review_cycle_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);
        upload(&app).await;

        let (_, notes) = send_json(&app, get("/api/notes")).await;
        assert_eq!(notes["notes"], json!(["N1", "N2"]));

        let (status, view) = send_json(&app, post("/api/notes/N1/select", Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["draft"], "Yes");
        assert_eq!(view["can_save"], false);

        let (status, body) = send_json(&app, post("/api/notes/N1/save", Body::empty())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "review");

        let (status, view) = send_json(
            &app,
            post_json("/api/notes/N1/approve", json!({ "response": "Yes, normal" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "approved");
        assert_eq!(view["approved_response"], "Yes, normal");

        let (status, saved) = send_json(&app, post("/api/notes/N1/save", Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["saved"]["expert_response"], "Yes, normal");
        assert_eq!(saved["session"]["remaining"], 1);

        let (_, notes) = send_json(&app, get("/api/notes")).await;
        assert_eq!(notes["notes"], json!(["N2"]));
        assert!(dir.path().join("store.xlsx").exists());
    }

    #[tokio::test]
    async fn test_upload_missing_columns_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);

        let (status, body) = send_json(
            &app,
            post(
                "/api/upload?mode=needs_generation",
                Body::from("Note Id,Question\nN1,Q\n"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "schema_validation");
        assert!(body["message"].as_str().unwrap().contains("Prompt"));
    }

    #[tokio::test]
    async fn test_approve_requires_matching_selection() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);
        upload(&app).await;

        send(&app, post("/api/notes/N1/select", Body::empty())).await;
        let (status, body) =
            send_json(&app, post_json("/api/notes/N2/approve", json!({}))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_export_downloads_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);

        let (status, _) = send(&app, get("/api/export")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        upload(&app).await;
        send(&app, post("/api/notes/N2/select", Body::empty())).await;
        send(&app, post_json("/api/notes/N2/approve", json!({}))).await;
        send(&app, post("/api/notes/N2/save", Body::empty())).await;

        let response = app.clone().oneshot(get("/api/export")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"expert_responses.xlsx\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"PK"));

        let (_, saved) = send_json(&app, get("/api/saved")).await;
        assert_eq!(saved[0]["note_id"], "N2");
        assert_eq!(saved[0]["expert_response"], "None known");
    }

    #[tokio::test]
    async fn test_foreign_origin_cannot_read_or_act() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);

        let request = Request::get("/api/saved")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());

        let request = Request::post("/api/upload?mode=has_response&name=notes.csv")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::from(UPLOAD))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, notes) = send_json(&app, get("/api/notes")).await;
        assert_eq!(notes["notes"], json!([]));
    }

    #[tokio::test]
    async fn test_local_origin_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);

        let request = Request::get("/api/saved")
            .header(header::ORIGIN, "http://localhost:3141")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3141"
        );
    }

    #[tokio::test]
    async fn test_index_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&dir);

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&body).contains("Expert Review"));
    }
}
