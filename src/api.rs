// 🌐 HTTP API - upload and analyze endpoints (feature = "server")
//
// POST /upload        multipart form, field "file" holding document text
// POST /api/analyze   JSON {"text": ..., "seed": optional u64}
// GET  /health        liveness

use crate::config::ServerConfig;
use crate::pipeline::DocumentAnalyzer;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<DocumentAnalyzer>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(analyzer: DocumentAnalyzer, server: &ServerConfig) -> Self {
        AppState {
            analyzer: Arc::new(analyzer),
            max_upload_bytes: server.max_upload_bytes,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy" })
}

/// Shared tail of both analysis endpoints
fn run_analysis(state: &AppState, request_id: Uuid, source: &str, text: &str, seed: Option<u64>) -> Response {
    match state.analyzer.analyze_with_seed(text, seed) {
        Ok(payload) => {
            info!(
                %request_id,
                source,
                bytes = text.len(),
                entities = payload.entities.total(),
                "document analyzed"
            );
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            warn!(%request_id, error = %e, "analysis failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /upload - multipart document upload
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(%request_id, error = %e, "malformed multipart body");
                return error_response(e.status(), e.body_text());
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document").to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((filename, bytes.to_vec())),
            Err(e) => {
                warn!(%request_id, error = %e, "failed to read upload bytes");
                return error_response(e.status(), e.body_text());
            }
        }
    }

    let Some((filename, bytes)) = file else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    if bytes.len() > state.max_upload_bytes {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File too large. Maximum {} bytes.", state.max_upload_bytes),
        );
    }

    // Text extraction from binary formats happens upstream
    let text = String::from_utf8_lossy(&bytes);
    run_analysis(&state, request_id, &filename, &text, None)
}

/// POST /api/analyze - analyze raw text
async fn analyze(State(state): State<AppState>, Json(request): Json<AnalyzeRequest>) -> Response {
    if request.text.len() > state.max_upload_bytes {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Text too large. Maximum {} bytes.", state.max_upload_bytes),
        );
    }
    run_analysis(&state, Uuid::new_v4(), "api", &request.text, request.seed)
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze));

    Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
