//! HTTP API.
//!
//! | Method | Path                      | Purpose                              |
//! |--------|---------------------------|--------------------------------------|
//! | POST   | `/api/files`              | upload documents, start extraction   |
//! | GET    | `/api/files`              | list records                         |
//! | DELETE | `/api/files`              | clear the queue                      |
//! | GET    | `/api/files/{id}`         | one record                           |
//! | PATCH  | `/api/files/{id}`         | edit a completed record's text       |
//! | DELETE | `/api/files/{id}`         | remove a record                      |
//! | GET    | `/api/files/{id}/export`  | download `<name>_extracted.txt`      |
//! | GET    | `/api/aggregate`          | aggregated corpus as plain text      |
//! | GET    | `/api/aggregate/export`   | download the aggregated corpus       |
//! | GET    | `/api/events`             | SSE stream of store snapshots        |

pub mod error;
pub mod events;
pub mod files;
pub mod upload;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            post(upload::upload_handler)
                .get(files::list_files)
                .delete(files::clear_files),
        )
        .route(
            "/files/{id}",
            get(files::get_file)
                .patch(files::update_file)
                .delete(files::delete_file),
        )
        .route("/files/{id}/export", get(files::export_file))
        .route("/aggregate", get(files::get_aggregate))
        .route("/aggregate/export", get(files::export_aggregate))
        .route("/events", get(events::stream_events))
}
