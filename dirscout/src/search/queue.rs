//! Directory task queue
//!
//! An unbounded multi-producer/multi-consumer channel of directories still to
//! be listed. Workers are both consumers and producers: every subdirectory
//! they discover goes back into the same queue. Because the channel never
//! fills, a worker enqueueing a large fan-out can never wait on another
//! worker that is itself waiting to enqueue.

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use tracing::trace;

use super::tracker::CompletionTracker;

/// A directory waiting to be listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTask {
    pub path: PathBuf,
}

impl DirTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug)]
pub struct TaskQueue {
    sender: Sender<DirTask>,
    receiver: Receiver<DirTask>,
    tracker: CompletionTracker,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            tracker: CompletionTracker::new(),
        }
    }

    /// Enqueues a task, registering it with the completion tracker first
    pub fn push(&self, task: DirTask) {
        self.tracker.register();
        if let Err(err) = self.sender.send(task) {
            // Only possible once the receiver is gone; account for the task anyway
            trace!(path = %err.0.path.display(), "Queue disconnected, dropping task");
            self.tracker.complete();
        }
    }

    /// Blocks until a task is available, or returns `None` once all work is done
    pub fn pop(&self) -> Option<DirTask> {
        select! {
            recv(self.receiver) -> task => task.ok(),
            recv(self.tracker.closed()) -> _ => None,
        }
    }

    /// Marks one popped task as fully processed
    pub fn complete(&self) {
        if self.tracker.complete() {
            trace!("All directory tasks complete, queue closed");
        }
    }

    /// Number of tasks waiting to be picked up
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Tasks enqueued but not yet completed, including those being processed
    pub fn outstanding(&self) -> usize {
        self.tracker.outstanding()
    }

    pub fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes its task when dropped, including during a panic unwind, so a
/// crashing worker cannot leave the rest of the pool waiting forever
pub struct TaskGuard<'a> {
    queue: &'a TaskQueue,
}

impl<'a> TaskGuard<'a> {
    pub fn new(queue: &'a TaskQueue) -> Self {
        Self { queue }
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.queue.complete();
    }
}
