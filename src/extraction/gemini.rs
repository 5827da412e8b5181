//! Gemini extraction gateway.
//!
//! Sends the document inline to the Generative Language `generateContent`
//! endpoint together with the extraction prompt, and returns the text parts
//! of the first candidate.

use super::provider::{ExtractionError, ExtractionGateway, ExtractionRequest};
use crate::config::GatewayConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Extraction gateway backed by the Gemini API.
#[derive(Debug)]
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GeminiGateway {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-3-flash-preview";

    /// Create a new Gemini gateway with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Check if an API key is available.
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
        let model = self.config.model.as_deref().unwrap_or(Self::DEFAULT_MODEL);
        format!("{base}/v1beta/models/{model}:generateContent")
    }

    fn build_body<'a>(&self, request: &'a ExtractionRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &request.mime_type,
                            data: &request.data,
                        },
                    },
                    Part::Text {
                        text: request.prompt,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Pull a readable message out of an error response body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| format!("Gemini API error ({status}): {body}"))
}

#[async_trait]
impl ExtractionGateway for GeminiGateway {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            ExtractionError::Configuration(
                "API Key is missing. Please ensure the environment is configured correctly."
                    .to_string(),
            )
        })?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| ExtractionError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "Gemini request rejected");
            return Err(ExtractionError::Gateway(error_message(status, &body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Gateway(e.to_string()))?;

        Ok(parsed.text())
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig {
            api_key: Some("test-key".to_string()),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_endpoint_defaults() {
        let gateway = GeminiGateway::new(config());
        assert_eq!(
            gateway.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_endpoint_overrides() {
        let gateway = GeminiGateway::new(GatewayConfig {
            base_url: Some("http://localhost:9000/".to_string()),
            model: Some("gemini-custom".to_string()),
            ..config()
        });
        assert_eq!(
            gateway.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-custom:generateContent"
        );
    }

    #[test]
    fn test_body_shape() {
        let gateway = GeminiGateway::new(config());
        let request = ExtractionRequest::new("AAAA", "application/pdf");
        let body = serde_json::to_value(gateway.build_body(&request)).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], request.prompt);
        assert_eq!(body["generationConfig"]["topK"], 64);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Q1 "},{"text":"revenue"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), "Q1 revenue");

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"error":{"code":400,"message":"unsupported format"}}"#;
        assert_eq!(
            error_message(reqwest::StatusCode::BAD_REQUEST, body),
            "unsupported format"
        );
        assert!(error_message(reqwest::StatusCode::BAD_GATEWAY, "oops").contains("502"));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let gateway = GeminiGateway::new(GatewayConfig {
            api_key: None,
            ..GatewayConfig::default()
        });
        assert!(!gateway.is_configured());
        let err = gateway
            .extract(&ExtractionRequest::new("AAAA", "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Configuration(_)));
    }
}
