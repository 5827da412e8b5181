//! Extraction gateways: the external services that turn document bytes into text.
//!
//! # Gateways
//!
//! - [`GeminiGateway`] - Google Gemini `generateContent` with inline data
//! - [`MistralGateway`] - Mistral OCR API
//! - [`LocalGateway`] - offline fallback, text files only
//!
//! # Usage
//!
//! ```rust,ignore
//! use doc_extract::extraction::{ExtractionRequest, GatewayFactory};
//!
//! let gateway = GatewayFactory::create(&config.gateway);
//! let text = gateway.extract(&ExtractionRequest::new(encoded, "application/pdf")).await?;
//! ```

mod factory;
mod gemini;
mod local;
mod mistral;
mod provider;

pub use factory::GatewayFactory;
pub use gemini::GeminiGateway;
pub use local::LocalGateway;
pub use mistral::MistralGateway;
pub use provider::{EXTRACTION_PROMPT, ExtractionError, ExtractionGateway, ExtractionRequest};
