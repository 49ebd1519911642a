use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Process-wide traversal counters, shared by all workers.
///
/// Values are only meaningful once traversal has completed; they are never
/// used to decide when the walk is done.
#[derive(Debug, Default)]
pub struct SearchCounters {
    directories_visited: AtomicU64,
    files_scanned: AtomicU64,
    files_matched: AtomicU64,
    failures: AtomicU64,
}

impl SearchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_directory(&self) {
        self.directories_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_match(&self) {
        self.files_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn directories_visited(&self) -> u64 {
        self.directories_visited.load(Ordering::Relaxed)
    }

    pub fn files_scanned(&self) -> u64 {
        self.files_scanned.load(Ordering::Relaxed)
    }

    pub fn files_matched(&self) -> u64 {
        self.files_matched.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Logs the final counters
    pub fn log_stats(&self) {
        info!(
            directories = self.directories_visited(),
            files = self.files_scanned(),
            matched = self.files_matched(),
            failures = self.failures(),
            "Traversal counters"
        );
    }
}
