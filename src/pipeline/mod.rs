//! Per-file processing pipeline.
//!
//! Every ingested input becomes one [`FileRecord`] and one spawned task.
//! The task reads the input, base64-encodes it, calls the extraction
//! gateway once and writes the outcome back through [`FileStore::update`].
//! Tasks share nothing but the store, so one file's failure never touches
//! another file's record.
//!
//! A record removed while its task is in flight is not cancelled: the
//! final `update` finds no record and is a no-op.

mod input;

pub use input::{ByteSource, RawInput};

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::extraction::{ExtractionError, ExtractionGateway, ExtractionRequest};
use crate::store::{ExtractionMethod, FileRecord, FileStore, RecordPatch};

/// Content stored when the gateway succeeds but returns no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text could be extracted.";

/// Drives files from `Idle` to `Completed` or `Error`.
#[derive(Debug, Clone)]
pub struct Pipeline {
    store: FileStore,
    gateway: Arc<dyn ExtractionGateway>,
}

/// The records created by one [`Pipeline::ingest`] call and their tasks.
#[derive(Debug)]
pub struct IngestBatch {
    records: Vec<FileRecord>,
    tasks: Vec<JoinHandle<()>>,
}

impl IngestBatch {
    /// Records as they were right after ingestion, in input order.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Ids of the created records, in input order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Wait for every task in the batch to finish.
    pub async fn wait(self) -> Vec<FileRecord> {
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Extraction task did not finish");
            }
        }
        self.records
    }

    /// Let the tasks run in the background and keep only the records.
    #[must_use]
    pub fn detach(self) -> Vec<FileRecord> {
        self.records
    }
}

impl Pipeline {
    pub fn new(store: FileStore, gateway: Arc<dyn ExtractionGateway>) -> Self {
        Self { store, gateway }
    }

    /// The store this pipeline writes to.
    #[must_use]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Name of the configured gateway.
    #[must_use]
    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    /// Create one record per input and launch their processing concurrently.
    ///
    /// Records are added as `Idle` and marked `Processing` before this
    /// returns, so the store already reflects in-flight state. Must be
    /// called from within a tokio runtime.
    pub fn ingest(&self, inputs: Vec<RawInput>) -> IngestBatch {
        let pairs: Vec<(FileRecord, RawInput)> = inputs
            .into_iter()
            .map(|input| {
                let record = FileRecord::new(&input.name, &input.mime_type, input.size_bytes);
                (record, input)
            })
            .collect();

        self.store.add(pairs.iter().map(|(record, _)| record.clone()));

        let mut records = Vec::with_capacity(pairs.len());
        let mut tasks = Vec::with_capacity(pairs.len());
        for (record, input) in pairs {
            let record = self
                .store
                .update(&record.id, &RecordPatch::processing())
                .unwrap_or(record);
            tasks.push(self.spawn(record.id.clone(), input));
            records.push(record);
        }

        info!(count = records.len(), gateway = self.gateway.name(), "Files ingested");
        IngestBatch { records, tasks }
    }

    fn spawn(&self, id: String, input: RawInput) -> JoinHandle<()> {
        let pipeline = self.clone();
        let span = tracing::info_span!("extract", file_id = %id, file = %input.name);
        tokio::spawn(
            async move {
                let outcome = AssertUnwindSafe(pipeline.process(&id, &input))
                    .catch_unwind()
                    .await;
                if outcome.is_err() {
                    warn!("Extraction task panicked");
                    pipeline
                        .store
                        .update(&id, &RecordPatch::failed("Extraction task panicked"));
                }
            }
            .instrument(span),
        )
    }

    /// Run one record through read → extract → finalize.
    async fn process(&self, id: &str, input: &RawInput) {
        let patch = match self.extract(input).await {
            Ok(text) => {
                let content = if text.is_empty() {
                    NO_TEXT_PLACEHOLDER.to_string()
                } else {
                    text
                };
                info!(chars = content.len(), "Extraction completed");
                RecordPatch::completed(content, ExtractionMethod::for_mime_type(&input.mime_type))
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed");
                RecordPatch::failed(e.to_string())
            }
        };

        if self.store.update(id, &patch).is_none() {
            debug!("Record removed before extraction finished, result discarded");
        }
    }

    async fn extract(&self, input: &RawInput) -> Result<String, ExtractionError> {
        let bytes = input.source.read().await?;
        let request = ExtractionRequest::new(STANDARD.encode(&bytes), &input.mime_type);
        self.gateway.extract(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStatus;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Replies based on the decoded payload: `fail:<msg>`, `slow:<text>`,
    /// `panic`, or anything else echoed back.
    #[derive(Debug)]
    struct EchoGateway;

    #[async_trait]
    impl ExtractionGateway for EchoGateway {
        async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
            let bytes = STANDARD.decode(&request.data).unwrap();
            let text = String::from_utf8(bytes).unwrap();
            if let Some(msg) = text.strip_prefix("fail:") {
                return Err(ExtractionError::Gateway(msg.to_string()));
            }
            if let Some(rest) = text.strip_prefix("slow:") {
                tokio::time::sleep(Duration::from_secs(5)).await;
                return Ok(rest.to_string());
            }
            if text == "panic" {
                panic!("gateway exploded");
            }
            Ok(text)
        }

        fn name(&self) -> &'static str {
            "Echo"
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(FileStore::new(), Arc::new(EchoGateway))
    }

    fn input(name: &str, body: &str) -> RawInput {
        RawInput::from_bytes(name, "application/pdf", body.as_bytes().to_vec())
    }

    #[tokio::test(start_paused = true)]
    async fn test_ingest_marks_processing_immediately() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![input("a.pdf", "slow:a"), input("b.pdf", "b")]);

        assert_eq!(pipeline.store().len(), 2);
        assert!(batch.records().iter().all(|r| r.status == FileStatus::Processing));
        assert_eq!(batch.records()[0].progress, 10);
        batch.wait().await;
    }

    #[tokio::test]
    async fn test_success_completes_record() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![input("report.pdf", "Q1 revenue...")]);
        let id = batch.ids().remove(0);
        batch.wait().await;

        let record = pipeline.store().get(&id).unwrap();
        assert_eq!(record.status, FileStatus::Completed);
        assert_eq!(record.content, "Q1 revenue...");
        assert_eq!(record.method, ExtractionMethod::Hybrid);
        assert_eq!(record.progress, 100);
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_text_uses_placeholder() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![input("blank.pdf", ""), input("spaces.pdf", "  ")]);
        let ids = batch.ids();
        batch.wait().await;

        let store = pipeline.store();
        assert_eq!(store.get(&ids[0]).unwrap().content, NO_TEXT_PLACEHOLDER);
        assert_eq!(store.get(&ids[1]).unwrap().content, "  ");
    }

    #[tokio::test]
    async fn test_failure_sets_error_only() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![RawInput::from_bytes(
            "broken.png",
            "image/png",
            b"fail:unsupported format".to_vec(),
        )]);
        let id = batch.ids().remove(0);
        batch.wait().await;

        let record = pipeline.store().get(&id).unwrap();
        assert_eq!(record.status, FileStatus::Error);
        assert_eq!(record.error.as_deref(), Some("unsupported format"));
        assert_eq!(record.content, "");
    }

    #[tokio::test]
    async fn test_image_method_label() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![RawInput::from_bytes(
            "scan.jpg",
            "image/jpeg",
            b"text".to_vec(),
        )]);
        let id = batch.ids().remove(0);
        batch.wait().await;

        assert_eq!(
            pipeline.store().get(&id).unwrap().method,
            ExtractionMethod::AiOcr
        );
    }

    #[tokio::test]
    async fn test_unreadable_input_fails_only_that_record() {
        let pipeline = pipeline();
        let missing = RawInput {
            name: "gone.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 0,
            source: ByteSource::Path("/definitely/not/here.pdf".into()),
        };
        let batch = pipeline.ingest(vec![missing, input("ok.pdf", "fine")]);
        let ids = batch.ids();
        batch.wait().await;

        let store = pipeline.store();
        assert_eq!(store.get(&ids[0]).unwrap().status, FileStatus::Error);
        assert_eq!(store.get(&ids[1]).unwrap().status, FileStatus::Completed);
    }

    #[tokio::test]
    async fn test_panicking_gateway_is_contained() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![input("bad.pdf", "panic"), input("ok.pdf", "fine")]);
        let ids = batch.ids();
        batch.wait().await;

        let store = pipeline.store();
        let bad = store.get(&ids[0]).unwrap();
        assert_eq!(bad.status, FileStatus::Error);
        assert_eq!(bad.error.as_deref(), Some("Extraction task panicked"));
        assert_eq!(store.get(&ids[1]).unwrap().status, FileStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_record_result_is_discarded() {
        let pipeline = pipeline();
        let batch = pipeline.ingest(vec![input("a.pdf", "slow:late"), input("b.pdf", "b")]);
        let ids = batch.ids();

        pipeline.store().remove(&ids[0]);
        batch.wait().await;

        let records = pipeline.store().list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, ids[1]);
    }
}
