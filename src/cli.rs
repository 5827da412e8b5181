//! One-shot `extract` command.
//!
//! Runs local files through the same pipeline the server uses, then writes
//! each completed record to `<out>/<base>_extracted.txt`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::aggregate::{aggregate, completed_count};
use crate::api::upload::is_allowed_mime_type;
use crate::export::{AGGREGATE_BASE_NAME, DirectorySink, ExportSink};
use crate::pipeline::{Pipeline, RawInput};
use crate::store::{FileRecord, FileStatus};

/// Options for the `extract` command.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub paths: Vec<PathBuf>,
    pub out: PathBuf,
    pub aggregate: bool,
    pub copy: bool,
}

/// Outcome of one `extract` run.
#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub completed: usize,
    pub failed: usize,
    pub written: Vec<PathBuf>,
    /// Exports that replaced a file already written in this run.
    pub overwritten: Vec<PathBuf>,
}

impl ExtractSummary {
    /// True when every processed file completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Expand the given paths into the list of files to process.
///
/// Files named directly are always kept. Directories are walked
/// recursively and only documents of an accepted type are picked up.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(walkdir::DirEntry::into_path)
                .filter(|p| is_document(p))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn is_document(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| is_allowed_mime_type(mime.essence_str()))
}

/// Process the files and write the results.
pub async fn run_extract(
    pipeline: &Pipeline,
    sink: &DirectorySink,
    options: &ExtractOptions,
) -> anyhow::Result<ExtractSummary> {
    let files = collect_files(&options.paths);
    if files.is_empty() {
        anyhow::bail!("No documents found in the given paths");
    }

    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        inputs.push(RawInput::from_path(path).await);
    }

    let ingested = pipeline.ingest(inputs).wait().await;
    let records: Vec<FileRecord> = ingested
        .iter()
        .filter_map(|r| pipeline.store().get(&r.id))
        .collect();

    let mut summary = ExtractSummary::default();
    let mut seen = HashSet::new();
    for record in &records {
        match record.status {
            FileStatus::Completed => {
                let handle = sink.export_text(&record.content, &record.name).await?;
                println!(
                    "ok     {} -> {} ({})",
                    record.name,
                    handle.file_name,
                    record.method.label()
                );
                summary.completed += 1;
                if let Some(path) = handle.path {
                    if !seen.insert(path.clone()) {
                        warn!(
                            file = %record.name,
                            path = %path.display(),
                            "Export overwrote an earlier file from this run"
                        );
                        summary.overwritten.push(path.clone());
                    }
                    summary.written.push(path);
                }
            }
            _ => {
                let reason = record.error.as_deref().unwrap_or("not processed");
                println!("error  {}: {reason}", record.name);
                summary.failed += 1;
            }
        }
    }

    if options.aggregate || options.copy {
        let corpus = aggregate(&records);
        if options.aggregate {
            let handle = sink.export_text(&corpus, AGGREGATE_BASE_NAME).await?;
            println!("aggregate ({} files) -> {}", completed_count(&records), handle.file_name);
            summary.written.extend(handle.path);
        }
        if options.copy {
            match sink.copy_to_clipboard(&corpus).await {
                Ok(()) => println!("aggregate copied to clipboard"),
                Err(e) => warn!(error = %e, "Clipboard copy failed"),
            }
        }
    }

    info!(
        completed = summary.completed,
        failed = summary.failed,
        out = %sink.dir().display(),
        "Extraction run finished"
    );
    Ok(summary)
}
