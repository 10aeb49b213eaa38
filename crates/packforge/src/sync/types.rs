//! Shared types for sync runs.

use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::composer::manifest::MANIFEST_FILENAME;
use crate::entity::run_status::RunStatus;
use crate::store::LogCounts;

/// Default number of per-ref tasks in flight for one run.
pub const DEFAULT_SYNC_CONCURRENCY: usize = 8;

/// Tuning knobs for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Maximum per-ref tasks in flight at once.
    pub concurrency: usize,
    /// Manifest path read at each changed ref, relative to the repo root.
    pub manifest_path: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_SYNC_CONCURRENCY,
            manifest_path: MANIFEST_FILENAME.to_string(),
        }
    }
}

/// Per-outcome counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCounts {
    /// Versions created for refs not seen before.
    pub added: usize,
    /// Versions overwritten because the ref moved.
    pub updated: usize,
    /// Refs skipped (no manifest, malformed manifest).
    pub skipped: usize,
    /// Refs whose task failed (provider read error, store error).
    pub failed: usize,
    /// Stored versions pruned because their ref disappeared.
    pub removed: usize,
}

impl SyncCounts {
    /// Refs that went through the per-ref pipeline.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.added + self.updated + self.skipped + self.failed
    }
}

impl From<SyncCounts> for LogCounts {
    fn from(c: SyncCounts) -> Self {
        LogCounts {
            added: c.added as i32,
            updated: c.updated as i32,
            skipped: c.skipped as i32,
            failed: c.failed as i32,
            removed: c.removed as i32,
        }
    }
}

/// Result of one orchestrated run over one repository.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub repository_id: Uuid,
    /// The sync log row this run finalized.
    pub log_id: Uuid,
    /// Batch the run belonged to.
    pub batch_id: Uuid,
    pub status: RunStatus,
    pub counts: SyncCounts,
    /// Run-fatal error, when the run failed before tasks could settle.
    pub error_message: Option<String>,
    /// Per-ref detail lines (skip reasons, task failures).
    pub details: Vec<String>,
    /// Whether the run observed a cancellation request.
    pub cancelled: bool,
}

/// Cooperative cancellation flag shared across a batch.
///
/// Cancelling stops new per-ref tasks from doing work; tasks already past
/// their cancellation check run to completion, so the store is never left
/// with a half-written version row.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = SyncOptions::default();
        assert_eq!(options.concurrency, DEFAULT_SYNC_CONCURRENCY);
        assert_eq!(options.manifest_path, "composer.json");
    }

    #[test]
    fn counts_processed_excludes_removed() {
        let counts = SyncCounts {
            added: 2,
            updated: 1,
            skipped: 3,
            failed: 1,
            removed: 5,
        };
        assert_eq!(counts.processed(), 7);
    }

    #[test]
    fn cancel_token_latches() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
