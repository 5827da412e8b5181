//! File upload handler.
//!
//! Accepts multipart form data, filters it to the document types the
//! service is meant for, and hands the accepted files to the pipeline.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;

use super::error::ApiError;
use crate::AppState;
use crate::pipeline::RawInput;
use crate::store::FileRecord;

/// Accepted MIME types (exact match or prefix).
const ALLOWED_MIME_PREFIXES: &[&str] = &[
    "application/pdf",
    "image/",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Check whether an upload of this type is accepted.
pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_PREFIXES
        .iter()
        .any(|prefix| mime_type.starts_with(prefix))
}

/// Response for the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Records created for accepted files, already processing.
    pub files: Vec<FileRecord>,
    /// Files that were rejected, with the reason.
    pub errors: Vec<String>,
}

/// POST /api/files
///
/// Every accepted file gets a record and starts processing right away.
/// Rejected files are reported in `errors` and do not affect the others.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let limits = &state.config.upload;
    let mut inputs = Vec::new();
    let mut errors = Vec::new();
    let mut total_size: usize = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest {
            message: format!("Failed to read multipart field: {e}"),
            code: "MULTIPART_ERROR",
        })?
    {
        // Plain form fields carry no file name; skip them.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if inputs.len() >= limits.max_files {
            errors.push(format!("Maximum file count ({}) exceeded", limits.max_files));
            break;
        }

        let declared_type = field
            .content_type()
            .filter(|ct| *ct != "application/octet-stream")
            .unwrap_or_default()
            .to_string();

        let data = field.bytes().await.map_err(|e| ApiError::BadRequest {
            message: format!("Failed to read file '{filename}': {e}"),
            code: "READ_ERROR",
        })?;

        let size = data.len();
        if size > limits.max_file_size {
            errors.push(format!(
                "File '{}' exceeds max size ({}MB > {}MB)",
                filename,
                size / (1024 * 1024),
                limits.max_file_size / (1024 * 1024)
            ));
            continue;
        }

        if total_size + size > limits.max_total_size {
            errors.push(format!(
                "Total upload size would exceed limit ({}MB)",
                limits.max_total_size / (1024 * 1024)
            ));
            break;
        }

        let input = RawInput::from_bytes(filename, declared_type, data);
        if !is_allowed_mime_type(&input.mime_type) {
            errors.push(format!(
                "File '{}' has unsupported type: {}",
                input.name, input.mime_type
            ));
            continue;
        }

        total_size += size;
        inputs.push(input);
    }

    tracing::info!(
        accepted = inputs.len(),
        rejected = errors.len(),
        total_size,
        "Upload received"
    );

    let files = state.pipeline.ingest(inputs).detach();

    Ok((StatusCode::ACCEPTED, Json(UploadResponse { files, errors })))
}
