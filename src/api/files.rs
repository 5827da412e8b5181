//! Record and aggregate handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::error::ApiError;
use crate::AppState;
use crate::aggregate::aggregate;
use crate::export::{AGGREGATE_BASE_NAME, export_file_name};
use crate::store::{FileRecord, FileStatus, RecordPatch};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Request body for editing a record's text.
#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
}

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> Json<Vec<FileRecord>> {
    Json(state.store.list())
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileRecord>, ApiError> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// PATCH /api/files/{id} - replace the extracted text of a completed file.
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<FileRecord>, ApiError> {
    let record = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;

    if record.status != FileStatus::Completed {
        return Err(ApiError::Conflict(format!(
            "File '{}' cannot be edited until extraction has completed",
            record.name
        )));
    }

    state
        .store
        .update(&id, &RecordPatch::content(req.content))
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// DELETE /api/files/{id}
///
/// Removing an unknown id is a no-op. An in-flight extraction for a
/// removed file finishes in the background and its result is dropped.
pub async fn delete_file(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.store.remove(&id).is_some() {
        tracing::info!(file_id = %id, "File removed");
    }
    StatusCode::NO_CONTENT
}

/// DELETE /api/files
pub async fn clear_files(State(state): State<AppState>) -> StatusCode {
    state.store.clear();
    tracing::info!("File queue cleared");
    StatusCode::NO_CONTENT
}

/// GET /api/files/{id}/export
pub async fn export_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state.store.get(&id).ok_or(ApiError::NotFound(id))?;
    Ok(text_attachment(record.content, &record.name))
}

/// GET /api/aggregate
pub async fn get_aggregate(State(state): State<AppState>) -> Response {
    let text = aggregate(&state.store.list());
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], text).into_response()
}

/// GET /api/aggregate/export
pub async fn export_aggregate(State(state): State<AppState>) -> Response {
    let text = aggregate(&state.store.list());
    text_attachment(text, AGGREGATE_BASE_NAME)
}

/// A `text/plain` download named `<base>_extracted.txt`.
fn text_attachment(content: String, suggested_name: &str) -> Response {
    let file_name = export_file_name(suggested_name).replace(['"', '\r', '\n'], "_");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_headers() {
        let response = text_attachment("hello".to_string(), "report.pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report_extracted.txt\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
    }

    #[test]
    fn test_attachment_name_is_sanitized() {
        let response = text_attachment(String::new(), "we\"ird.pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"we_ird_extracted.txt\""
        );
    }
}
