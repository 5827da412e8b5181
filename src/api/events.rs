//! Server-sent snapshot stream.
//!
//! Emits the full record list plus the aggregate on connect and again
//! after every store revision. Each event is built from one snapshot.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::WatchStream;

use crate::AppState;
use crate::aggregate::{aggregate, completed_count};
use crate::store::{FileRecord, FileStore};

/// One consistent view of the store.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub revision: u64,
    pub files: Vec<FileRecord>,
    pub completed: usize,
    pub aggregate: String,
}

impl Snapshot {
    /// Capture the store's current state.
    pub fn capture(store: &FileStore, revision: u64) -> Self {
        let files = store.list();
        Self {
            revision,
            completed: completed_count(&files),
            aggregate: aggregate(&files),
            files,
        }
    }
}

/// GET /api/events
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let store = state.store.clone();
    let stream = WatchStream::new(store.subscribe()).map(move |revision| {
        let snapshot = Snapshot::capture(&store, revision);
        let json = serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
        Ok(Event::default().event("snapshot").data(json))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
