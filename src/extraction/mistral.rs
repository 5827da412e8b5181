//! Mistral OCR extraction gateway.
//!
//! Uses Mistral's document AI API. PDFs are sent as a `document_url`,
//! everything else as an `image_url`, both carrying a base64 data URL.

use super::provider::{ExtractionError, ExtractionGateway, ExtractionRequest};
use crate::config::GatewayConfig;
use async_trait::async_trait;

/// Extraction gateway using the Mistral OCR API.
#[derive(Debug)]
pub struct MistralGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl MistralGateway {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.mistral.ai";

    /// Default OCR model.
    pub const DEFAULT_MODEL: &'static str = "mistral-ocr-latest";

    /// Create a new Mistral OCR gateway with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Check if the gateway is properly configured for use.
    pub fn is_configured(&self) -> bool {
        self.config.api_key().is_some()
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/v1/ocr")
    }

    fn build_body(&self, request: &ExtractionRequest) -> serde_json::Value {
        let doc_type = if request.mime_type == "application/pdf" {
            "document_url"
        } else {
            "image_url"
        };

        serde_json::json!({
            "model": self.config.model.as_deref().unwrap_or(Self::DEFAULT_MODEL),
            "document": {
                "type": doc_type,
                doc_type: request.data_url()
            },
            "table_format": "markdown"
        })
    }
}

/// Join page markdown from an OCR response.
fn pages_markdown(result: &serde_json::Value) -> String {
    result
        .get("pages")
        .and_then(|p| p.as_array())
        .map(|pages| {
            pages
                .iter()
                .filter_map(|page| page.get("markdown").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("\n\n---\n\n")
        })
        .unwrap_or_default()
}

#[async_trait]
impl ExtractionGateway for MistralGateway {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            ExtractionError::Configuration("Mistral API key not configured".to_string())
        })?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| ExtractionError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Gateway(format!(
                "Mistral OCR error ({status}): {error_text}"
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractionError::Gateway(e.to_string()))?;

        Ok(pages_markdown(&result))
    }

    fn name(&self) -> &'static str {
        "Mistral OCR"
    }
}
