//! File record storage.
//!
//! This module holds the in-memory state for every ingested file. The
//! [`FileStore`] is the single source of truth: the pipeline writes to it,
//! while the HTTP API, the event stream and the CLI read snapshots from it.
//!
//! # Architecture
//!
//! - [`FileRecord`]: one ingested input and its extraction state
//! - [`RecordPatch`]: a partial update merged into a record by id
//! - [`FileStore`]: thread-safe ordered store with change notification
//!
//! # Example
//!
//! ```rust
//! use doc_extract::store::{FileRecord, FileStore, RecordPatch, FileStatus};
//!
//! let store = FileStore::new();
//! let record = FileRecord::new("report.pdf", "application/pdf", 2048);
//! let id = record.id.clone();
//! store.add(vec![record]);
//!
//! store.update(&id, &RecordPatch::processing());
//! assert_eq!(store.get(&id).unwrap().status, FileStatus::Processing);
//! ```

mod record;
#[allow(clippy::module_inception)]
mod store;

pub use record::{ExtractionMethod, FileRecord, FileStatus, RecordPatch, UNKNOWN_ERROR};
pub use store::FileStore;
