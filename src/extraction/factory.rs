//! Factory for creating extraction gateways based on configuration.

use super::gemini::GeminiGateway;
use super::local::LocalGateway;
use super::mistral::MistralGateway;
use super::provider::ExtractionGateway;
use crate::config::GatewayConfig;
use std::sync::Arc;

/// Factory for creating extraction gateways based on configuration.
#[derive(Debug)]
pub struct GatewayFactory;

impl GatewayFactory {
    /// Create a gateway based on `config.provider`.
    ///
    /// # Provider Selection
    ///
    /// - `gemini` / `mistral`: always returns that gateway, even without an
    ///   API key. Calls then fail per file with a configuration error, so the
    ///   server still starts.
    /// - `local`: offline text-only gateway.
    /// - `auto` (or anything else): Gemini if a key is present, else local.
    pub fn create(config: &GatewayConfig) -> Arc<dyn ExtractionGateway> {
        match config.provider.as_str() {
            "gemini" => {
                let gateway = GeminiGateway::new(config.clone());
                if !gateway.is_configured() {
                    tracing::warn!("Gemini selected but no API key is configured");
                }
                tracing::info!("Using Gemini for text extraction");
                Arc::new(gateway)
            }
            "mistral" => {
                let gateway = MistralGateway::new(config.clone());
                if !gateway.is_configured() {
                    tracing::warn!("Mistral selected but no API key is configured");
                }
                tracing::info!("Using Mistral OCR for text extraction");
                Arc::new(gateway)
            }
            "local" => {
                tracing::info!("Using local text extraction (text files only)");
                Arc::new(LocalGateway::new())
            }
            _ => {
                let gemini = GeminiGateway::new(config.clone());
                if gemini.is_configured() {
                    tracing::info!("Using Gemini for text extraction");
                    return Arc::new(gemini);
                }
                tracing::info!("No API key configured, using local text extraction");
                Arc::new(LocalGateway::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, api_key: Option<&str>) -> GatewayConfig {
        GatewayConfig {
            provider: provider.to_string(),
            api_key: api_key.map(str::to_string),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_create_local() {
        assert_eq!(GatewayFactory::create(&config("local", None)).name(), "Local");
    }

    #[test]
    fn test_create_gemini_without_key() {
        assert_eq!(GatewayFactory::create(&config("gemini", None)).name(), "Gemini");
    }

    #[test]
    fn test_create_mistral() {
        assert_eq!(
            GatewayFactory::create(&config("mistral", Some("k"))).name(),
            "Mistral OCR"
        );
    }

    #[test]
    fn test_auto_prefers_gemini_with_key() {
        assert_eq!(GatewayFactory::create(&config("auto", Some("k"))).name(), "Gemini");
    }

    #[test]
    fn test_auto_falls_back_to_local() {
        assert_eq!(GatewayFactory::create(&config("auto", None)).name(), "Local");
    }
}
