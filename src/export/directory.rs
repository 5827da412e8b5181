//! Export sink writing plain-text files into a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ExportError, ExportHandle, ExportSink, clipboard, export_file_name};

/// Writes each export to `<dir>/<base>_extracted.txt`, overwriting any
/// previous file of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn export_text(
        &self,
        content: &str,
        suggested_name: &str,
    ) -> Result<ExportHandle, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = export_file_name(suggested_name);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, content).await?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "Export written");
        Ok(ExportHandle {
            file_name,
            path: Some(path),
        })
    }

    async fn copy_to_clipboard(&self, content: &str) -> Result<(), ExportError> {
        clipboard::copy(content).await
    }
}
