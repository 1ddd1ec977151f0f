//! Per-category progress reporting.
//!
//! Split and merge walk the categories of a partition one by one. They
//! report through [`ProgressCallback`] so the library stays free of any
//! terminal code: the `spotmap` binary plugs in a progress bar, tests and
//! library callers plug in [`NullProgress`].

use std::sync::Arc;

/// Receives progress from split and merge runs.
///
/// One unit of work is one category file written or read.
pub trait ProgressCallback: Send + Sync {
    /// Announces how many category files the run will touch.
    fn set_total(&self, total: u64);

    /// Records `delta` more category files as done.
    fn inc(&self, delta: u64);

    /// Names the category currently being processed.
    fn set_message(&self, msg: String);

    /// Ends the run with a summary line.
    fn finish(&self, msg: String);
}

/// Discards every progress update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
