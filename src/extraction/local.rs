//! Local extraction gateway.
//!
//! An offline fallback that needs no API key. It decodes text-like
//! documents directly and rejects binary formats (PDF, images, Word),
//! which need a model-backed gateway.

use super::provider::{ExtractionError, ExtractionGateway, ExtractionRequest};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};

/// Local gateway for text-based files.
#[derive(Debug, Default)]
pub struct LocalGateway;

impl LocalGateway {
    /// Create a new local gateway.
    pub fn new() -> Self {
        Self
    }

    /// Check if this gateway can handle the given MIME type.
    pub fn supports_mime_type(mime_type: &str) -> bool {
        mime_type.starts_with("text/")
            || matches!(mime_type, "application/json" | "application/xml")
    }
}

#[async_trait]
impl ExtractionGateway for LocalGateway {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        if !Self::supports_mime_type(&request.mime_type) {
            return Err(ExtractionError::Gateway(format!(
                "Local extraction cannot process {}: configure an AI gateway (gemini or mistral)",
                request.mime_type
            )));
        }

        let bytes = STANDARD
            .decode(&request.data)
            .map_err(|e| ExtractionError::Ingestion(format!("Invalid payload encoding: {e}")))?;

        String::from_utf8(bytes)
            .map_err(|_| ExtractionError::Gateway("File is not valid UTF-8 text".to_string()))
    }

    fn name(&self) -> &'static str {
        "Local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_text() {
        assert!(LocalGateway::supports_mime_type("text/plain"));
        assert!(LocalGateway::supports_mime_type("text/markdown"));
        assert!(LocalGateway::supports_mime_type("application/json"));
    }

    #[test]
    fn test_does_not_support_pdf() {
        assert!(!LocalGateway::supports_mime_type("application/pdf"));
    }

    #[tokio::test]
    async fn test_extracts_text() {
        let request = ExtractionRequest::new(STANDARD.encode("Hello, World!"), "text/plain");
        let text = LocalGateway::new().extract(&request).await.unwrap();
        assert_eq!(text, "Hello, World!");
    }

    #[tokio::test]
    async fn test_rejects_binary_types() {
        let request = ExtractionRequest::new(STANDARD.encode([0u8, 1, 2]), "image/png");
        let err = LocalGateway::new().extract(&request).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let request = ExtractionRequest::new(STANDARD.encode([0xffu8, 0xfe]), "text/plain");
        let err = LocalGateway::new().extract(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "File is not valid UTF-8 text");
    }
}
