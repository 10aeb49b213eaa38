//! Progress reporting for sync runs.
//!
//! Two layers: [`SyncProgress`] events stream to an optional callback for
//! UI consumption, and [`RunProgress`] accumulates the counters and detail
//! lines that end up on the finalized sync log row.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use uuid::Uuid;

use super::types::SyncCounts;

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A run started for a repository.
    RunStarted {
        repository_id: Uuid,
        batch_id: Uuid,
    },

    /// Both ref listings came back from the provider.
    RefsListed {
        tags: usize,
        branches: usize,
    },

    /// Change detection finished.
    ChangesDetected {
        /// Refs that will get a per-ref task.
        to_sync: usize,
        /// All refs observed upstream.
        total_refs: usize,
    },

    /// A ref's version was written.
    RefSynced {
        ref_name: String,
        version: String,
        /// True when the version row was created rather than overwritten.
        added: bool,
    },

    /// A ref was skipped (no manifest, malformed manifest, cancellation).
    RefSkipped {
        ref_name: String,
        reason: String,
    },

    /// A ref's task failed.
    RefFailed {
        ref_name: String,
        error: String,
    },

    /// A stored version was pruned because its ref disappeared.
    VersionPruned {
        package_id: Uuid,
        version: String,
    },

    /// The run settled and its log row was finalized.
    RunFinalized {
        repository_id: Uuid,
        success: bool,
        counts: SyncCounts,
    },

    /// Warning message (non-fatal).
    Warning {
        message: String,
    },
}

/// Callback for progress updates during sync runs.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

/// Shared counter state for one run's concurrent per-ref tasks.
///
/// Counters are atomics and the detail list is a mutex; tasks only append,
/// the orchestrator snapshots once after the queue drains.
#[derive(Debug, Default)]
pub struct RunProgress {
    added: AtomicUsize,
    updated: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    details: Mutex<Vec<String>>,
}

impl RunProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_added(&self) {
        self.added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self, detail: String) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        self.push_detail(detail);
    }

    pub fn record_failed(&self, detail: String) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.push_detail(detail);
    }

    fn push_detail(&self, detail: String) {
        if let Ok(mut details) = self.details.lock() {
            details.push(detail);
        }
    }

    /// Snapshot the counters. `removed` is filled in by the prune phase.
    #[must_use]
    pub fn counts(&self) -> SyncCounts {
        SyncCounts {
            added: self.added.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            removed: 0,
        }
    }

    /// Drain the accumulated detail lines.
    #[must_use]
    pub fn take_details(&self) -> Vec<String> {
        self.details
            .lock()
            .map(|mut details| std::mem::take(&mut *details))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let progress = RunProgress::new();
        progress.record_added();
        progress.record_added();
        progress.record_updated();
        progress.record_skipped("v1.0.0: no composer.json".to_string());
        progress.record_failed("main: network error".to_string());

        let counts = progress.counts();
        assert_eq!(counts.added, 2);
        assert_eq!(counts.updated, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.removed, 0);

        let details = progress.take_details();
        assert_eq!(details.len(), 2);
        assert!(progress.take_details().is_empty());
    }

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(
            None,
            SyncProgress::Warning {
                message: "nothing listens".to_string(),
            },
        );
    }

    #[test]
    fn emit_invokes_the_callback() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        let seen = Arc::new(AtomicBool::new(false));
        let seen_inner = seen.clone();
        let cb: ProgressCallback = Box::new(move |event| {
            if matches!(event, SyncProgress::RefsListed { tags: 3, .. }) {
                seen_inner.store(true, Ordering::SeqCst);
            }
        });

        emit(
            Some(&cb),
            SyncProgress::RefsListed {
                tags: 3,
                branches: 1,
            },
        );
        assert!(seen.load(Ordering::SeqCst));
    }
}
