use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Counts directory tasks that have been enqueued but not yet fully processed.
///
/// A task is registered before it becomes visible to workers and completed
/// only after every entry of its directory has been handled, so the count can
/// only reach zero once no task exists anywhere: queued, in flight, or about
/// to be enqueued by a sibling. Reaching zero fires the close signal exactly
/// once.
#[derive(Debug)]
pub struct CompletionTracker {
    outstanding: AtomicUsize,
    close_tx: Mutex<Option<Sender<()>>>,
    close_rx: Receiver<()>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        let (close_tx, close_rx) = bounded(0);
        Self {
            outstanding: AtomicUsize::new(0),
            close_tx: Mutex::new(Some(close_tx)),
            close_rx,
        }
    }

    /// Registers one new unit of work
    pub fn register(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one unit of work finished. Returns true if this was the last one.
    pub fn complete(&self) -> bool {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "completed more tasks than were registered");
        if previous == 1 {
            self.close();
            true
        } else {
            false
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Receiver that becomes disconnected once all work is done
    pub fn closed(&self) -> &Receiver<()> {
        &self.close_rx
    }

    pub fn is_closed(&self) -> bool {
        self.close_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    // Dropping the only sender disconnects every receiver clone
    fn close(&self) {
        self.close_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}
