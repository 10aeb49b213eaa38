//! Sync engine: change detection, per-ref tasks, pruning, orchestration.

pub mod changes;
pub mod orchestrator;
pub mod progress;
pub mod prune;
pub mod queue;
pub mod types;

pub use changes::{detect_changes, RefChange, StoredShas};
pub use orchestrator::{SyncError, SyncOrchestrator};
pub use progress::{emit, ProgressCallback, RunProgress, SyncProgress};
pub use prune::stale_versions;
pub use queue::{SerialTaskQueue, TaskQueue, TokioTaskQueue};
pub use types::{CancelToken, SyncCounts, SyncOptions, SyncOutcome, DEFAULT_SYNC_CONCURRENCY};
