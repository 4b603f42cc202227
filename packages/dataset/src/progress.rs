//! Progress reporting for dataset loads.
//!
//! The loader only knows about [`ProgressCallback`]; the binary decides
//! whether that renders as an `indicatif` bar or nothing at all.

use std::sync::Arc;

/// Receives progress updates while datasets are downloaded and parsed.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (files for a multi-file load).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
