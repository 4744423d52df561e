use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use parley_core::codec::{ExportFormat, ImportFormat};
use parley_core::session::{BulkDeleteResult, Message, SessionFilter, SessionStats, SessionSummary};
use parley_core::Error;

use crate::state::AppState;

/// Core error wrapper carrying the HTTP status mapping
pub struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

#[derive(serde::Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(serde::Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = payload.session_id.unwrap_or_else(|| "default".to_string());

    state
        .manager
        .append_message(&session_id, Message::stamped("user", &payload.message));

    let history = state.manager.get_history(&session_id);
    let start = history.len().saturating_sub(state.context_messages);
    let reply = state.model.complete(&history[start..]).await?;

    state
        .manager
        .append_message(&session_id, Message::stamped("assistant", &reply));

    Ok(Json(ChatResponse { session_id, reply }))
}

pub async fn list_sessions_handler(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> Json<Vec<SessionSummary>> {
    Json(state.manager.list_sessions(&filter))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.manager.get_session_stats())
}

#[derive(serde::Deserialize)]
pub struct FormatQuery {
    pub format: String,
}

pub async fn export_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::parse(&query.format)?;
    let body = state.manager.export_session(&session_id, format)?;

    let content_type = match format {
        ExportFormat::Json => "application/json",
        ExportFormat::Csv => "text/csv",
        ExportFormat::Markdown => "text/markdown",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

pub async fn import_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<FormatQuery>,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let format = ImportFormat::parse(&query.format)?;
    let imported = state.manager.import_session(&session_id, format, &body)?;
    Ok(Json(serde_json::json!({ "imported": imported })))
}

pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    let deleted = state.manager.delete_session(&session_id);
    Json(serde_json::json!({ "deleted": deleted }))
}

#[derive(serde::Deserialize)]
pub struct BulkDeleteRequest {
    pub session_ids: Vec<String>,
}

pub async fn bulk_delete_handler(
    State(state): State<AppState>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Json<BulkDeleteResult> {
    Json(state.manager.delete_multiple_sessions(&payload.session_ids))
}

pub async fn clear_sessions_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cleared = state.manager.clear_all_sessions();
    Json(serde_json::json!({ "cleared": cleared }))
}
