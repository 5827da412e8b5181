#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use doc_extract::config::{AppConfig, GatewayConfig, LogConfig, ServerConfig, UploadConfig};
use doc_extract::extraction::{ExtractionError, ExtractionGateway, ExtractionRequest};
use doc_extract::store::{FileRecord, FileStore};

/// Gateway driven by the document bytes:
///
/// - `fail:<message>` fails with `<message>`
/// - `sleep:<ms>:<text>` waits, then returns `<text>`
/// - `empty` returns an empty string
/// - anything else is returned without trailing whitespace
#[derive(Debug, Default)]
pub struct ScriptedGateway;

#[async_trait]
impl ExtractionGateway for ScriptedGateway {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let bytes = STANDARD
            .decode(&request.data)
            .map_err(|e| ExtractionError::Ingestion(e.to_string()))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        if let Some(message) = text.strip_prefix("fail:") {
            return Err(ExtractionError::Gateway(message.to_string()));
        }
        if let Some(rest) = text.strip_prefix("sleep:") {
            let (ms, body) = rest.split_once(':').unwrap_or((rest, ""));
            let ms: u64 = ms.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            return Ok(body.to_string());
        }
        if text == "empty" {
            return Ok(String::new());
        }
        Ok(text.trim_end().to_string())
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }
}

pub fn gateway() -> Arc<dyn ExtractionGateway> {
    Arc::new(ScriptedGateway)
}

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            request_timeout_secs: 30,
        },
        upload: UploadConfig::default(),
        gateway: GatewayConfig::default(),
        log: LogConfig::default(),
    })
}

/// Wait until every record in the store is terminal.
pub async fn settle(store: &FileStore) -> Vec<FileRecord> {
    let mut revisions = store.subscribe();
    loop {
        let records = store.list();
        if records.iter().all(|r| r.status.is_terminal()) {
            return records;
        }
        if tokio::time::timeout(Duration::from_secs(5), revisions.changed())
            .await
            .is_err()
        {
            panic!("records did not settle: {records:?}");
        }
    }
}
