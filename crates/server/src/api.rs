// server/api.rs
// HTTP handlers and router for the labor board

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};
use labor_board_core::{normalize_date, CountAction, LaborBoard, PositionEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::health::{check_health, HealthResponse};
use crate::ingest::{self, IngestError, UploadArtifact};
use crate::view::{render_board, BoardPage};
use crate::SharedState;

/// Largest roster upload accepted, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Status/message pair returned by every mutation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
}

impl StatusMessage {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: Status::Success,
            message: message.into(),
            filename: None,
            dates: Vec::new(),
        })
    }

    fn err(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: Status::Error,
            message: message.into(),
            filename: None,
            dates: Vec::new(),
        })
    }
}

type ApiResult = (StatusCode, Json<StatusMessage>);

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    date_str: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PositionCountRequest {
    position: String,
    action: String, // "add", "remove"
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    date: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    associate: String,
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application router.
///
/// The legacy trailing-slash paths are the ones the board page calls; the
/// `/api` paths are aliases for scripted clients.
pub fn build_router(state: SharedState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(view_board))
        .route("/health", get(health))
        .route("/api/health", get(health))
        // Board
        .route("/api/board", get(board_snapshot))
        .route("/api/catalog", get(get_catalog))
        // Roster upload
        .route("/uploadfile/", post(upload_roster))
        .route("/api/upload", post(upload_roster))
        // Catalog counts
        .route("/update_position_count/", post(update_position_count))
        .route("/api/catalog/count", post(update_position_count))
        // Slot assignment
        .route("/update_position/", post(update_position))
        .route("/api/assign", post(update_position))
        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Board Endpoints
// ============================================================================

/// Date requested by the client, or today in local time.
fn resolve_date(requested: Option<String>) -> String {
    requested
        .as_deref()
        .and_then(normalize_date)
        .unwrap_or_else(|| chrono::Local::now().date_naive().format("%Y-%m-%d").to_string())
}

/// Snapshot a date, creating its record if this is the first look at it.
/// The new record is not persisted here.
async fn load_page(state: &SharedState, date: &str) -> BoardPage {
    let mut board = state.board.write().await;
    if !board.contains(date) {
        tracing::debug!("Creating empty board for {}", date);
    }
    let day = board.get_or_create(date).clone();
    BoardPage::build(date, &board, &day, &mut rand::thread_rng())
}

async fn view_board(
    State(state): State<SharedState>,
    Query(query): Query<BoardQuery>,
) -> Html<String> {
    let date = resolve_date(query.date_str);
    let page = load_page(&state, &date).await;
    Html(render_board(&page))
}

async fn board_snapshot(
    State(state): State<SharedState>,
    Query(query): Query<BoardQuery>,
) -> Json<BoardPage> {
    let date = resolve_date(query.date_str);
    Json(load_page(&state, &date).await)
}

async fn get_catalog(State(state): State<SharedState>) -> Json<Vec<PositionEntry>> {
    let board = state.board.read().await;
    Json(board.catalog().entries().to_vec())
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(check_health(&state).await)
}

// ============================================================================
// Mutation Endpoints
// ============================================================================

fn persist(state: &SharedState, board: &LaborBoard) -> Result<(), ApiResult> {
    state.store.save(board).map_err(|e| {
        tracing::error!("Failed to save labor board: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusMessage::err(format!("An unexpected error occurred: {}", e)),
        )
    })
}

fn ingest_failure(err: &IngestError) -> ApiResult {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, StatusMessage::err(err.user_message()))
}

/// Pull the `file` field out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), IngestError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(IngestError::MissingFile),
            Err(e) => {
                tracing::warn!("Malformed upload body: {}", e);
                return Err(IngestError::MissingFile);
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        return match field.bytes().await {
            Ok(bytes) => Ok((file_name, bytes.to_vec())),
            Err(e) => Err(IngestError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))),
        };
    }
}

async fn upload_roster(State(state): State<SharedState>, mut multipart: Multipart) -> impl IntoResponse {
    let (file_name, bytes) = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(e) => return ingest_failure(&e),
    };

    let artifact = match UploadArtifact::save(&state.upload_dir, &file_name, &bytes) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Could not store upload {}: {}", file_name, e);
            return ingest_failure(&e);
        }
    };

    let batch = match ingest::read_roster(&file_name, &bytes) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!("Rejected roster {}: {}", file_name, e);
            artifact.discard();
            return ingest_failure(&e);
        }
    };

    let dates = {
        let mut board = state.board.write().await;
        let dates = board.apply_roster(&batch, &mut rand::thread_rng());
        if let Err(failure) = persist(&state, &board) {
            artifact.discard();
            return failure;
        }
        dates
    };

    tracing::info!(
        "Roster {} loaded for {} date(s): {}",
        file_name,
        dates.len(),
        dates.join(", ")
    );

    let mut body = StatusMessage::ok("File processed successfully!");
    body.filename = Some(file_name);
    body.dates = dates;
    (StatusCode::OK, body)
}

async fn update_position_count(
    State(state): State<SharedState>,
    Json(req): Json<PositionCountRequest>,
) -> impl IntoResponse {
    let action = match CountAction::parse(&req.action) {
        Ok(action) => action,
        Err(e) => return (StatusCode::BAD_REQUEST, StatusMessage::err(e.to_string())),
    };

    let mut board = state.board.write().await;
    match board.adjust_catalog(&req.position, action) {
        Ok(count) => {
            if let Err(failure) = persist(&state, &board) {
                return failure;
            }
            tracing::info!("Position {} count now {}", req.position, count);
            (
                StatusCode::OK,
                StatusMessage::ok(format!("{} count updated to {}.", req.position, count)),
            )
        }
        Err(e) => {
            tracing::debug!("Count update refused: {}", e);
            let status = if e.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::BAD_REQUEST
            };
            (
                status,
                StatusMessage::err("Position not found or cannot be removed."),
            )
        }
    }
}

async fn update_position(
    State(state): State<SharedState>,
    Form(req): Form<AssignRequest>,
) -> impl IntoResponse {
    let date = normalize_date(&req.date).unwrap_or_default();

    let mut board = state.board.write().await;
    match board.assign(&date, &req.position, &req.associate) {
        Ok(()) => {
            if let Err(failure) = persist(&state, &board) {
                return failure;
            }
            tracing::info!("{}: {} -> {:?}", date, req.position, req.associate);
            (
                StatusCode::OK,
                StatusMessage::ok(format!("Updated {} with {}", req.position, req.associate)),
            )
        }
        Err(e) => {
            tracing::debug!("Assignment refused: {}", e);
            (
                StatusCode::NOT_FOUND,
                StatusMessage::err("Failed to update position"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_date_normalizes() {
        assert_eq!(resolve_date(Some("07/04/2024".into())), "2024-07-04");
        assert_eq!(resolve_date(Some("2024-07-04".into())), "2024-07-04");
    }

    #[test]
    fn test_resolve_date_defaults_to_today() {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(resolve_date(None), today);
        assert_eq!(resolve_date(Some("  ".into())), today);
    }
}
