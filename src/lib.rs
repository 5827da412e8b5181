//! Document text extraction service.
//!
//! Upload PDFs, images and Word documents, get their text back from an AI
//! extraction gateway, then view, edit and export the results one by one
//! or as a single aggregated corpus.
//!
//! # Architecture
//!
//! - **Store**: ordered in-memory records, the single source of truth
//! - **Pipeline**: one independent task per file, `Idle → Processing → Completed | Error`
//! - **Aggregate**: pure function from a store snapshot to the corpus text
//! - **Server**: Axum HTTP API with SSE snapshots
//!
//! # Modules
//!
//! - [`store`]: file records and the store
//! - [`pipeline`]: ingestion and per-file processing
//! - [`extraction`]: gateway trait and implementations
//! - [`aggregate`]: corpus rendering
//! - [`export`]: file and clipboard sinks
//! - [`api`]: HTTP handlers

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod export;
pub mod extraction;
pub mod pipeline;
pub mod server;
pub mod store;
pub mod telemetry;

use crate::config::AppConfig;

use pipeline::Pipeline;
use std::sync::Arc;
use store::FileStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// File records.
    pub store: FileStore,
    /// Processing pipeline writing into `store`.
    pub pipeline: Pipeline,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
