use crossbeam_channel::Sender;
use std::fs::{self, DirEntry};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};

use super::queue::{DirTask, TaskGuard, TaskQueue};
use super::snippet::scan;
use crate::config::ErrorPolicy;
use crate::errors::{SearchError, SearchResult};
use crate::filters::Filters;
use crate::metrics::SearchCounters;
use crate::results::FileResult;

/// State shared by every worker in the pool.
///
/// The result and failure senders live here so that both streams disconnect
/// once the last worker exits and drops its handle.
pub(crate) struct Shared {
    pub term: String,
    pub filters: Arc<Filters>,
    pub queue: TaskQueue,
    pub counters: Arc<SearchCounters>,
    pub policy: ErrorPolicy,
    pub cancelled: Arc<AtomicBool>,
    pub results: Sender<FileResult>,
    pub failures: Sender<SearchError>,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn record_failure(&self, worker: usize, err: SearchError) {
        self.counters.record_failure();
        match self.policy {
            ErrorPolicy::Skip => {
                debug!(worker, error = %err, "Skipping unreadable entry");
            }
            ErrorPolicy::FailFast => {
                error!(worker, error = %err, "Aborting search");
                self.cancel();
            }
        }
        // The engine holds the receiver until every worker has been joined
        let _ = self.failures.send(err);
    }
}

/// Spawns one named worker thread draining the shared queue
pub(crate) fn spawn(id: usize, shared: Arc<Shared>) -> SearchResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("dirscout-worker-{id}"))
        .spawn(move || worker_loop(id, &shared))
        .map_err(SearchError::Spawn)
}

fn worker_loop(id: usize, shared: &Shared) {
    trace!(worker = id, "Worker starting");

    while let Some(task) = shared.queue.pop() {
        let _guard = TaskGuard::new(&shared.queue);
        if shared.is_cancelled() {
            trace!(worker = id, path = %task.path.display(), "Cancelled, dropping task");
            continue;
        }
        process_directory(id, &task, shared);
    }

    trace!(worker = id, "Worker exiting");
}

fn process_directory(id: usize, task: &DirTask, shared: &Shared) {
    let entries = match list_directory(task.path()) {
        Ok(entries) => entries,
        Err(err) => {
            shared.record_failure(id, err);
            return;
        }
    };

    debug!(worker = id, path = %task.path.display(), entries = entries.len(), "Listing directory");

    for entry in entries {
        if shared.is_cancelled() {
            return;
        }

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                shared.record_failure(id, SearchError::file_read(&path, e));
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();

        if file_type.is_dir() {
            if shared.filters.is_ignored_dir(&name) {
                trace!(path = %path.display(), "Ignoring directory");
                continue;
            }
            shared.counters.record_directory();
            shared.queue.push(DirTask::new(path));
            continue;
        }

        // Linked directories are not followed, which keeps link cycles out of the walk
        if file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_dir()) {
            trace!(path = %path.display(), "Not following directory symlink");
            continue;
        }

        if shared.filters.is_ignored_file(&path) {
            trace!(path = %path.display(), "Ignoring file by extension");
            continue;
        }

        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) => {
                shared.record_failure(id, SearchError::file_read(&path, e));
                continue;
            }
        };
        shared.counters.record_file();

        let matches = scan(&contents, &shared.term);
        trace!(path = %path.display(), matches = matches.len(), "Scanned file");
        if matches.is_empty() {
            continue;
        }

        shared.counters.record_match();
        let result = FileResult {
            directory: task.path.clone(),
            file_name: name,
            matches,
        };
        if shared.results.send(result).is_err() {
            debug!(worker = id, "Result consumer went away, cancelling");
            shared.cancel();
            return;
        }
    }
}

/// Lists a directory's immediate entries, sorted by name for reproducible output
fn list_directory(path: &Path) -> SearchResult<Vec<DirEntry>> {
    let mut entries = fs::read_dir(path)
        .and_then(|read_dir| read_dir.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| SearchError::directory_list(path, e))?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}
