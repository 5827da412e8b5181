//! The per-file unit of state and its patch type.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a file record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    /// Whether the status is `Completed` or `Error`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Which extraction strategy nominally applied to a file.
///
/// Purely informational: the pipeline sends every file through the same
/// gateway call regardless of this value. Serialized as its display label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ExtractionMethod {
    #[serde(rename = "AI-Powered OCR")]
    AiOcr,
    #[default]
    #[serde(rename = "Hybrid Logic (Direct + OCR)")]
    Hybrid,
}

impl ExtractionMethod {
    /// Label the method for a finished file of the given mime type.
    #[must_use]
    pub fn for_mime_type(mime_type: &str) -> Self {
        if mime_type.contains("image") {
            Self::AiOcr
        } else {
            Self::Hybrid
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AiOcr => "AI-Powered OCR",
            Self::Hybrid => "Hybrid Logic (Direct + OCR)",
        }
    }
}

/// Message stored when a record enters `Error` without one.
pub const UNKNOWN_ERROR: &str = "Unknown extraction error";

/// State for one ingested input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Extracted (or user-edited) text. Empty until completion.
    pub content: String,
    pub status: FileStatus,
    pub method: ExtractionMethod,
    /// Set if and only if `status == Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rough progress indicator, 0 to 100.
    pub progress: u8,
    pub created_at: String, // RFC3339
    pub updated_at: String, // RFC3339
}

impl FileRecord {
    /// Create a fresh `Idle` record with a new id.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            content: String::new(),
            status: FileStatus::Idle,
            method: ExtractionMethod::default(),
            error: None,
            progress: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Return a copy of this record with `patch` merged in.
    #[must_use]
    pub fn merged(&self, patch: &RecordPatch) -> Self {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(content) = &patch.content {
            next.content.clone_from(content);
        }
        if let Some(method) = patch.method {
            next.method = method;
        }
        if let Some(error) = &patch.error {
            next.error.clone_from(error);
        }
        if let Some(progress) = patch.progress {
            next.progress = progress.min(100);
        }
        // `error` is set if and only if the record is in `Error`.
        if next.status == FileStatus::Error {
            if next.error.is_none() {
                next.error = Some(UNKNOWN_ERROR.to_string());
            }
        } else {
            next.error = None;
        }
        next.updated_at = Utc::now().to_rfc3339();
        next
    }
}

/// A partial update for a [`FileRecord`].
///
/// `None` leaves a field untouched. `error` is doubly optional so a patch
/// can clear it (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub status: Option<FileStatus>,
    pub content: Option<String>,
    pub method: Option<ExtractionMethod>,
    pub error: Option<Option<String>>,
    pub progress: Option<u8>,
}

impl RecordPatch {
    /// Mark a record as in flight.
    #[must_use]
    pub fn processing() -> Self {
        Self {
            status: Some(FileStatus::Processing),
            error: Some(None),
            progress: Some(10),
            ..Self::default()
        }
    }

    /// Finish a record successfully with the given text.
    #[must_use]
    pub fn completed(content: impl Into<String>, method: ExtractionMethod) -> Self {
        Self {
            status: Some(FileStatus::Completed),
            content: Some(content.into()),
            method: Some(method),
            error: Some(None),
            progress: Some(100),
        }
    }

    /// Finish a record with a failure message. Content is left as is.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(FileStatus::Error),
            error: Some(Some(message.into())),
            ..Self::default()
        }
    }

    /// Replace the record's text (user edit).
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_idle() {
        let record = FileRecord::new("report.pdf", "application/pdf", 2048);
        assert_eq!(record.status, FileStatus::Idle);
        assert_eq!(record.method, ExtractionMethod::Hybrid);
        assert!(record.content.is_empty());
        assert!(record.error.is_none());
        assert_eq!(record.progress, 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = FileRecord::new("a.pdf", "application/pdf", 1);
        let b = FileRecord::new("a.pdf", "application/pdf", 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_failed_patch_keeps_content() {
        let record = FileRecord::new("scan.png", "image/png", 10);
        let failed = record
            .merged(&RecordPatch::processing())
            .merged(&RecordPatch::failed("unsupported format"));
        assert_eq!(failed.status, FileStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("unsupported format"));
        assert_eq!(failed.content, "");
        assert_eq!(failed.progress, 10);
    }

    #[test]
    fn test_completed_patch_clears_error() {
        let mut record = FileRecord::new("a.pdf", "application/pdf", 1);
        record.error = Some("stale".to_string());
        let done = record.merged(&RecordPatch::completed("text", ExtractionMethod::Hybrid));
        assert_eq!(done.status, FileStatus::Completed);
        assert!(done.error.is_none());
        assert_eq!(done.progress, 100);
    }

    #[test]
    fn test_method_for_mime_type() {
        assert_eq!(ExtractionMethod::for_mime_type("image/jpeg"), ExtractionMethod::AiOcr);
        assert_eq!(
            ExtractionMethod::for_mime_type("application/pdf"),
            ExtractionMethod::Hybrid
        );
        assert_eq!(ExtractionMethod::AiOcr.label(), "AI-Powered OCR");
    }

    #[test]
    fn test_method_serializes_as_label() {
        let json = serde_json::to_string(&ExtractionMethod::Hybrid).unwrap();
        assert_eq!(json, "\"Hybrid Logic (Direct + OCR)\"");
        let back: ExtractionMethod = serde_json::from_str("\"AI-Powered OCR\"").unwrap();
        assert_eq!(back, ExtractionMethod::AiOcr);
    }

    #[test]
    fn test_status_only_error_patch_gets_message() {
        let record = FileRecord::new("a.pdf", "application/pdf", 1);
        let patch = RecordPatch {
            status: Some(FileStatus::Error),
            ..RecordPatch::default()
        };
        let failed = record.merged(&patch);
        assert_eq!(failed.status, FileStatus::Error);
        assert_eq!(failed.error.as_deref(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_leaving_error_clears_message() {
        let failed = FileRecord::new("a.pdf", "application/pdf", 1)
            .merged(&RecordPatch::failed("boom"));
        let patch = RecordPatch {
            status: Some(FileStatus::Processing),
            ..RecordPatch::default()
        };
        let retried = failed.merged(&patch);
        assert_eq!(retried.status, FileStatus::Processing);
        assert!(retried.error.is_none());

        let stray = RecordPatch {
            error: Some(Some("stray".to_string())),
            ..RecordPatch::default()
        };
        assert!(retried.merged(&stray).error.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&FileStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        assert!(FileStatus::Error.is_terminal());
        assert!(!FileStatus::Processing.is_terminal());
    }
}
