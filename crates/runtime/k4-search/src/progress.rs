//! Progress reporting and cooperative cancellation.

use crate::phase::SearchPhase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress from a running search. Called from worker threads.
pub trait ProgressSink: Send + Sync {
    /// A phase with `total` units of work is starting.
    fn phase_started(&self, _phase: SearchPhase, _total: u64) {}

    /// One unit finished: a batch while sweeping, a keyword while
    /// prefiltering.
    fn advanced(&self, _attempts: u64, _matches: usize) {}

    fn finished(&self) {}
}

/// Discards every notification.
pub struct NullProgress;

impl ProgressSink for NullProgress {}

/// Shared stop flag. Checked before each batch starts; a started batch
/// always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
