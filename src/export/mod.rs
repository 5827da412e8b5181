//! Export and clipboard sinks.
//!
//! The core only decides *what* is exported (a record's current content or
//! the current aggregate, unmodified) and under which suggested name. Sinks
//! decide where it goes.
//!
//! - [`DirectorySink`] - writes `*_extracted.txt` files into a directory
//! - [`clipboard`] - pipes text into the platform clipboard tool

pub mod clipboard;
mod directory;

pub use directory::DirectorySink;

use async_trait::async_trait;
use std::path::PathBuf;

/// Suggested name for the aggregated corpus export.
pub const AGGREGATE_BASE_NAME: &str = "aggregated_documents";

/// Suffix appended to every exported file's base name.
pub const EXPORT_SUFFIX: &str = "_extracted.txt";

/// Build the export file name for a suggested name.
///
/// Any directory part is dropped and the base name is everything before
/// the first `.`, so `report.final.pdf` becomes `report_extracted.txt`.
#[must_use]
pub fn export_file_name(suggested_name: &str) -> String {
    let file_name = suggested_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(suggested_name);
    let base = file_name.split('.').next().unwrap_or_default().trim();
    let base = if base.is_empty() { "document" } else { base };
    format!("{base}{EXPORT_SUFFIX}")
}

/// Errors produced by export sinks.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportHandle {
    /// Final file name of the artifact.
    pub file_name: String,
    /// Location on disk, if the sink wrote one.
    pub path: Option<PathBuf>,
}

/// A destination for exported text.
#[async_trait]
pub trait ExportSink: Send + Sync + std::fmt::Debug {
    /// Export `content` as a plain-text artifact derived from `suggested_name`.
    async fn export_text(
        &self,
        content: &str,
        suggested_name: &str,
    ) -> Result<ExportHandle, ExportError>;

    /// Place `content` on the clipboard.
    async fn copy_to_clipboard(&self, content: &str) -> Result<(), ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("report.pdf"), "report_extracted.txt");
        assert_eq!(export_file_name("report.final.pdf"), "report_extracted.txt");
        assert_eq!(export_file_name("notes"), "notes_extracted.txt");
        assert_eq!(
            export_file_name(AGGREGATE_BASE_NAME),
            "aggregated_documents_extracted.txt"
        );
    }

    #[test]
    fn test_export_file_name_strips_directories() {
        assert_eq!(export_file_name("../../etc/passwd"), "passwd_extracted.txt");
        assert_eq!(export_file_name("C:\\scans\\page.png"), "page_extracted.txt");
        assert_eq!(export_file_name(".hidden"), "document_extracted.txt");
    }
}
