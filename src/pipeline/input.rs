//! Raw inputs accepted at the ingestion boundary.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::extraction::ExtractionError;

/// Where a raw input's bytes come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Bytes already held in memory (e.g. a multipart upload).
    Memory(Bytes),
    /// A file on disk, read when processing starts.
    Path(PathBuf),
}

impl ByteSource {
    /// Load the bytes.
    pub async fn read(&self) -> Result<Bytes, ExtractionError> {
        match self {
            Self::Memory(bytes) => Ok(bytes.clone()),
            Self::Path(path) => tokio::fs::read(path).await.map(Bytes::from).map_err(|e| {
                ExtractionError::Ingestion(format!("Failed to read {}: {e}", path.display()))
            }),
        }
    }
}

/// One document submitted for extraction.
#[derive(Debug, Clone)]
pub struct RawInput {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub source: ByteSource,
}

impl RawInput {
    /// An input held in memory.
    ///
    /// A blank declared MIME type is guessed from the file name.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let name = name.into();
        let data = data.into();
        Self {
            mime_type: resolve_mime_type(&name, mime_type.into()),
            size_bytes: data.len() as u64,
            name,
            source: ByteSource::Memory(data),
        }
    }

    /// An input backed by a file on disk. Only metadata is read here.
    ///
    /// A path that cannot be stat'ed still yields an input (with size 0);
    /// the read then fails inside the pipeline and only that record errors.
    pub async fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot stat input");
                0
            }
        };

        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        Self {
            mime_type: resolve_mime_type(&name, String::new()),
            size_bytes,
            name,
            source: ByteSource::Path(path.to_path_buf()),
        }
    }
}

fn resolve_mime_type(name: &str, declared: String) -> String {
    if declared.trim().is_empty() {
        mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string()
    } else {
        declared
    }
}
