use crossbeam_channel::{bounded, unbounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::queue::{DirTask, TaskQueue};
use super::worker::{self, Shared};
use crate::config::{ErrorPolicy, SearchConfig};
use crate::errors::{SearchError, SearchResult};
use crate::filters::Filters;
use crate::metrics::SearchCounters;
use crate::results::{FileResult, SearchOutput, SearchSummary};

/// A running search.
///
/// Results stream out of [`SearchHandle::results`] while the pool is still
/// walking the tree; [`SearchHandle::finish`] waits for the pool and returns
/// the final counts.
pub struct SearchHandle {
    results: Receiver<FileResult>,
    failures: Receiver<SearchError>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<SearchCounters>,
    cancelled: Arc<AtomicBool>,
    policy: ErrorPolicy,
    started: Instant,
}

impl SearchHandle {
    /// Blocking iterator over file results, ending once every worker has exited
    pub fn results(&self) -> impl Iterator<Item = FileResult> + '_ {
        self.results.iter()
    }

    /// Asks workers to stop at their next check. Queued directories are drained
    /// unlisted and [`SearchHandle::finish`] reports [`SearchError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Time since the search started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Waits for the pool to shut down and returns the final summary.
    ///
    /// Results not yet received are drained and counted in
    /// [`SearchSummary::unread_results`], so the walk always runs to completion
    /// unless cancelled. A cancelled run returns [`SearchError::Cancelled`];
    /// under [`ErrorPolicy::FailFast`] the first traversal failure is returned
    /// instead.
    pub fn finish(self) -> SearchResult<SearchSummary> {
        let SearchHandle {
            results,
            failures,
            workers,
            counters,
            cancelled,
            policy,
            started,
        } = self;

        // Ends once the last worker drops its sender
        let unread_results = results.iter().count();
        if unread_results > 0 {
            debug!(unread_results, "Drained results the caller never received");
        }

        let mut panicked = None;
        for (id, handle) in workers.into_iter().enumerate() {
            if handle.join().is_err() {
                panicked.get_or_insert(id);
            }
        }
        if let Some(id) = panicked {
            return Err(SearchError::WorkerPanicked(id));
        }

        let mut failures: Vec<SearchError> = failures.try_iter().collect();
        counters.log_stats();
        info!(elapsed = ?started.elapsed(), "Search finished");

        if policy == ErrorPolicy::FailFast && !failures.is_empty() {
            return Err(failures.swap_remove(0));
        }
        if cancelled.load(Ordering::Relaxed) {
            return Err(SearchError::Cancelled {
                directories_visited: counters.directories_visited(),
                files_scanned: counters.files_scanned(),
            });
        }

        Ok(SearchSummary {
            directories_visited: counters.directories_visited(),
            files_scanned: counters.files_scanned(),
            unread_results,
            failures,
        })
    }
}

/// Starts a concurrent search and returns a handle to its result stream.
///
/// The config is validated before anything touches the filesystem. The root
/// directory is seeded as the first task, then `thread_count` workers drain
/// the queue until the completion tracker reports no outstanding work.
pub fn run_search(config: &SearchConfig) -> SearchResult<SearchHandle> {
    config.validate()?;
    let started = Instant::now();

    info!(
        term = %config.term,
        root = %config.root_path.display(),
        threads = config.thread_count.get(),
        "Starting search"
    );

    let (results_tx, results_rx) = bounded(config.result_buffer.max(1));
    let (failures_tx, failures_rx) = unbounded();
    let counters = Arc::new(SearchCounters::new());
    let cancelled = Arc::new(AtomicBool::new(false));

    let queue = TaskQueue::new();
    queue.push(DirTask::new(config.root_path.clone()));

    let shared = Arc::new(Shared {
        term: config.term.clone(),
        filters: Arc::new(Filters::from_config(config)),
        queue,
        counters: Arc::clone(&counters),
        policy: config.error_policy,
        cancelled: Arc::clone(&cancelled),
        results: results_tx,
        failures: failures_tx,
    });

    let thread_count = config.thread_count.get();
    let mut workers = Vec::with_capacity(thread_count);
    for id in 0..thread_count {
        match worker::spawn(id, Arc::clone(&shared)) {
            Ok(handle) => workers.push(handle),
            Err(err) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(err);
            }
        }
    }
    debug!(workers = workers.len(), "Worker pool started");

    Ok(SearchHandle {
        results: results_rx,
        failures: failures_rx,
        workers,
        counters,
        cancelled,
        policy: config.error_policy,
        started,
    })
}

/// Runs a search to completion and collects every result, sorted by path
pub fn search(config: &SearchConfig) -> SearchResult<SearchOutput> {
    let handle = run_search(config)?;

    let mut output = SearchOutput::new();
    for file_result in handle.results() {
        output.add_file_result(file_result);
    }
    let summary = handle.finish()?;
    output.finish(summary);

    info!(
        "Search complete. Found {} matches in {} files",
        output.total_matches, output.files_with_matches
    );

    Ok(output)
}
