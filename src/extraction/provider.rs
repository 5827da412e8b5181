//! Core trait and types for extraction gateways.

use async_trait::async_trait;

/// Instruction sent alongside every document.
pub const EXTRACTION_PROMPT: &str = "Perform high-accuracy text extraction from this file. \
Maintain the original formatting, lists, tables and structure as closely as possible. \
If the document contains multiple languages (for example English and Arabic), extract each of them correctly. \
Transcribe handwritten text as well as printed text. \
Output only the extracted text.";

/// A request to turn one document into text.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Base64-encoded file bytes.
    pub data: String,
    /// Declared MIME type of the file.
    pub mime_type: String,
    /// Instruction for the model.
    pub prompt: &'static str,
}

impl ExtractionRequest {
    /// Build a request using the standard extraction prompt.
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            prompt: EXTRACTION_PROMPT,
        }
    }

    /// Encode as a `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Errors that can occur while processing a single file.
///
/// Every variant is contained to the file that produced it: the pipeline
/// turns it into that record's error message.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The raw input could not be read or decoded.
    #[error("{0}")]
    Ingestion(String),

    /// The gateway call failed. The message is shown to the user verbatim.
    #[error("{0}")]
    Gateway(String),

    /// The gateway cannot be used (e.g. missing credentials).
    #[error("{0}")]
    Configuration(String),
}

/// Trait for services that turn document bytes into text.
///
/// Implementors are opaque to the pipeline: a call either yields text
/// or fails with a message, and is never retried.
#[async_trait]
pub trait ExtractionGateway: Send + Sync + std::fmt::Debug {
    /// Extract text from the encoded document.
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError>;

    /// Gateway name for logging and debugging.
    fn name(&self) -> &'static str;
}
