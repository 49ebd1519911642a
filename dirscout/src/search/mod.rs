//! The concurrent traversal-and-search engine.
//!
//! ```text
//! run_search ── seed root ──> TaskQueue (unbounded, tracked by CompletionTracker)
//!                               │
//!           ┌───────────────────┼───────────────────┐
//!        worker 0            worker 1     ...    worker N-1
//!    pop dir → list → push subdirs back → read + scan files
//!           └───────────────────┼───────────────────┘
//!                               v
//!                  result stream (bounded) ──> SearchHandle::results
//! ```
//!
//! The tracker counts directories that are queued or being processed. When
//! it returns to zero the queue closes, idle workers exit, and once the last
//! worker drops its sender the result stream ends.
pub mod engine;
pub mod queue;
pub mod snippet;
pub mod tracker;
mod worker;

pub use engine::{run_search, search, SearchHandle};
pub use queue::{DirTask, TaskQueue};
pub use snippet::scan;
pub use tracker::CompletionTracker;
