//! The aggregated corpus: every completed record's text in store order.

use crate::store::{FileRecord, FileStatus};

/// Line printed between a block's header and its content.
pub const BLOCK_SEPARATOR: &str = "----------------------------";

/// Concatenate all completed records into one labelled corpus.
///
/// Records are taken in the order given (store insertion order), not in
/// the order they completed. Non-completed records are skipped. Returns
/// an empty string when nothing is completed.
#[must_use]
pub fn aggregate(records: &[FileRecord]) -> String {
    records
        .iter()
        .filter(|r| r.status == FileStatus::Completed)
        .map(|r| format!("FILE: {}\n{BLOCK_SEPARATOR}\n{}\n\n", r.name, r.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of records that [`aggregate`] would include.
#[must_use]
pub fn completed_count(records: &[FileRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.status == FileStatus::Completed)
        .count()
}
