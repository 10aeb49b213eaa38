//! Sync orchestration: one run per repository, batched per-ref tasks.
//!
//! A run is: create a pending sync log, list refs, diff against stored
//! state, dispatch one task per changed ref through the task queue, prune
//! versions whose ref disappeared, then finalize the log and the
//! repository's sync state exactly once.
//!
//! Failure isolation is strict: a provider listing failure is run-fatal
//! (the run finalizes as failed), but a failure inside one per-ref task
//! only marks that ref in the counts and details. The run itself still
//! finalizes as success, and siblings are never aborted.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::{DatabaseConnection, Set};
use thiserror::Error;
use uuid::Uuid;

use crate::composer::manifest::parse_manifest;
use crate::entity::package_version::ActiveModel as PackageVersionActiveModel;
use crate::entity::repository;
use crate::entity::run_status::RunStatus;
use crate::entity::sync_status::SyncStatus;
use crate::provider::{short_error_message, CredentialStore, GitProvider, ProviderRegistry};
use crate::store::{self, LogCounts, StoreError};

use super::changes::{detect_changes, RefChange, StoredShas};
use super::progress::{emit, ProgressCallback, RunProgress, SyncProgress};
use super::prune::stale_versions;
use super::queue::{TaskQueue, TokioTaskQueue};
use super::types::{CancelToken, SyncCounts, SyncOptions, SyncOutcome};

/// Errors that abort a sync call entirely, before a log row can capture
/// the outcome. Provider failures never surface here; they finalize the
/// run as failed instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Drives sync runs over connected repositories.
pub struct SyncOrchestrator {
    db: DatabaseConnection,
    registry: Arc<ProviderRegistry>,
    queue: Arc<dyn TaskQueue>,
    options: SyncOptions,
}

impl SyncOrchestrator {
    #[must_use]
    pub fn new(db: DatabaseConnection, registry: ProviderRegistry) -> Self {
        let options = SyncOptions::default();
        Self {
            db,
            registry: Arc::new(registry),
            queue: Arc::new(TokioTaskQueue::new(options.concurrency)),
            options,
        }
    }

    /// Replace the run options. Rebuilds the default queue to match the
    /// requested concurrency.
    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.queue = Arc::new(TokioTaskQueue::new(options.concurrency));
        self.options = options;
        self
    }

    /// Substitute the task queue. Tests use a serial queue here.
    #[must_use]
    pub fn with_queue(mut self, queue: Arc<dyn TaskQueue>) -> Self {
        self.queue = queue;
        self
    }

    /// Run one sync over a single repository.
    ///
    /// # Errors
    /// Only store failures bubble up; every provider-side failure is
    /// captured on the finalized sync log.
    pub async fn sync_repository(
        &self,
        repository_id: Uuid,
        credentials: &dyn CredentialStore,
        cancel: Arc<CancelToken>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<SyncOutcome> {
        self.run(repository_id, credentials, Uuid::new_v4(), cancel, on_progress.map(Arc::new))
            .await
    }

    /// Sync every repository of one organization under a shared batch id.
    pub async fn sync_org(
        &self,
        org_id: Uuid,
        credentials: &dyn CredentialStore,
        cancel: Arc<CancelToken>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Vec<SyncOutcome>> {
        let repos = store::repos::find_by_org(&self.db, org_id).await?;
        self.run_many(repos, credentials, cancel, on_progress).await
    }

    /// Sync every connected repository under a shared batch id.
    pub async fn sync_all(
        &self,
        credentials: &dyn CredentialStore,
        cancel: Arc<CancelToken>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Vec<SyncOutcome>> {
        let repos = store::repos::find_all(&self.db).await?;
        self.run_many(repos, credentials, cancel, on_progress).await
    }

    async fn run_many(
        &self,
        repos: Vec<repository::Model>,
        credentials: &dyn CredentialStore,
        cancel: Arc<CancelToken>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Vec<SyncOutcome>> {
        let batch_id = Uuid::new_v4();
        let on_progress = on_progress.map(Arc::new);
        let mut outcomes = Vec::with_capacity(repos.len());

        for repo in repos {
            // Repositories not yet started when the batch is cancelled are
            // not touched at all; no log row is created for them.
            if cancel.is_cancelled() {
                break;
            }
            let outcome = self
                .run(repo.id, credentials, batch_id, cancel.clone(), on_progress.clone())
                .await?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn run(
        &self,
        repository_id: Uuid,
        credentials: &dyn CredentialStore,
        batch_id: Uuid,
        cancel: Arc<CancelToken>,
        on_progress: Option<Arc<ProgressCallback>>,
    ) -> Result<SyncOutcome> {
        let repo = store::repos::get_by_id(&self.db, repository_id).await?;
        let log = store::sync_logs::create_pending(&self.db, repo.id, Some(batch_id)).await?;
        emit(
            on_progress.as_deref(),
            SyncProgress::RunStarted {
                repository_id: repo.id,
                batch_id,
            },
        );

        let provider = match self.registry.resolve(&repo, credentials).await {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(repository = %repo.remote_id, error = %e, "Provider resolution failed");
                return self
                    .finalize_fatal(&repo, log.id, batch_id, short_error_message(&e), on_progress)
                    .await;
            }
        };

        let (tags, branches) =
            match tokio::try_join!(provider.list_tags(), provider.list_branches()) {
                Ok(listings) => listings,
                Err(e) => {
                    tracing::warn!(repository = %repo.remote_id, error = %e, "Ref listing failed");
                    return self
                        .finalize_fatal(&repo, log.id, batch_id, short_error_message(&e), on_progress)
                        .await;
                }
            };
        emit(
            on_progress.as_deref(),
            SyncProgress::RefsListed {
                tags: tags.len(),
                branches: branches.len(),
            },
        );

        let stored = store::versions::find_by_repository(&self.db, repo.id).await?;
        let stored_shas: StoredShas = stored
            .iter()
            .map(|row| (row.version.clone(), row.source_reference.clone()))
            .collect();

        let changes = detect_changes(&tags, &branches, &stored_shas);
        emit(
            on_progress.as_deref(),
            SyncProgress::ChangesDetected {
                to_sync: changes.len(),
                total_refs: tags.len() + branches.len(),
            },
        );

        let progress = Arc::new(RunProgress::new());
        let source_url = provider.repository_url();
        let tasks: Vec<BoxFuture<'static, ()>> = changes
            .into_iter()
            .map(|change| {
                let existing = stored_shas.contains_key(&change.derived.raw);
                sync_ref_task(
                    self.db.clone(),
                    provider.clone(),
                    repo.org_id,
                    repo.id,
                    source_url.clone(),
                    self.options.manifest_path.clone(),
                    change,
                    existing,
                    progress.clone(),
                    cancel.clone(),
                    on_progress.clone(),
                )
                .boxed()
            })
            .collect();

        self.queue.run_all(tasks).await;

        let cancelled = cancel.is_cancelled();
        let mut counts = progress.counts();
        let mut details = progress.take_details();

        // Prune against the unfiltered listings. A cancelled run skips
        // pruning entirely; with tasks cut short, absence of a version is
        // not evidence the ref disappeared.
        if !cancelled {
            let stored = store::versions::find_by_repository(&self.db, repo.id).await?;
            for row in stale_versions(&stored, &tags, &branches) {
                match store::versions::delete(&self.db, row.id).await {
                    Ok(_) => {
                        counts.removed += 1;
                        emit(
                            on_progress.as_deref(),
                            SyncProgress::VersionPruned {
                                package_id: row.package_id,
                                version: row.version.clone(),
                            },
                        );
                    }
                    Err(e) => {
                        counts.failed += 1;
                        details.push(format!("prune {}: {e}", row.version));
                    }
                }
            }
        }

        // Task-local failures stay in the counts and details; only a run
        // that never got its tasks going (fatal errors above, or
        // cancellation) finalizes as failed.
        let status = if cancelled {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
        let error_message = cancelled.then(|| "Sync cancelled".to_string());

        self.finalize(&repo, log.id, status, counts, error_message.clone(), &details)
            .await?;
        emit(
            on_progress.as_deref(),
            SyncProgress::RunFinalized {
                repository_id: repo.id,
                success: status == RunStatus::Success,
                counts,
            },
        );

        Ok(SyncOutcome {
            repository_id: repo.id,
            log_id: log.id,
            batch_id,
            status,
            counts,
            error_message,
            details,
            cancelled,
        })
    }

    /// Finalize a run that failed before any per-ref task could start.
    async fn finalize_fatal(
        &self,
        repo: &repository::Model,
        log_id: Uuid,
        batch_id: Uuid,
        message: String,
        on_progress: Option<Arc<ProgressCallback>>,
    ) -> Result<SyncOutcome> {
        let counts = SyncCounts::default();
        self.finalize(repo, log_id, RunStatus::Failed, counts, Some(message.clone()), &[])
            .await?;
        emit(
            on_progress.as_deref(),
            SyncProgress::RunFinalized {
                repository_id: repo.id,
                success: false,
                counts,
            },
        );

        Ok(SyncOutcome {
            repository_id: repo.id,
            log_id,
            batch_id,
            status: RunStatus::Failed,
            counts,
            error_message: Some(message),
            details: Vec::new(),
            cancelled: false,
        })
    }

    /// Write the log row and the repository sync state, exactly once.
    async fn finalize(
        &self,
        repo: &repository::Model,
        log_id: Uuid,
        status: RunStatus,
        counts: SyncCounts,
        error_message: Option<String>,
        details: &[String],
    ) -> Result<()> {
        store::sync_logs::finalize(
            &self.db,
            log_id,
            status,
            LogCounts::from(counts),
            error_message,
            serde_json::json!(details),
        )
        .await?;

        let sync_status = match status {
            RunStatus::Success => SyncStatus::Ok,
            RunStatus::Failed | RunStatus::Pending => SyncStatus::Failed,
        };
        store::repos::set_sync_state(&self.db, repo.id, sync_status).await?;
        Ok(())
    }
}

/// One ref's pipeline: read manifest, parse, persist.
///
/// Infallible by contract; every outcome except cancellation lands in the
/// shared run progress.
#[allow(clippy::too_many_arguments)]
async fn sync_ref_task(
    db: DatabaseConnection,
    provider: Arc<dyn GitProvider>,
    org_id: Uuid,
    repository_id: Uuid,
    source_url: String,
    manifest_path: String,
    change: RefChange,
    existing: bool,
    progress: Arc<RunProgress>,
    cancel: Arc<CancelToken>,
    on_progress: Option<Arc<ProgressCallback>>,
) {
    let ref_name = change.git_ref.name.clone();

    // A task that observes cancellation never ran: it touches neither
    // storage nor any counter.
    if cancel.is_cancelled() {
        emit(
            on_progress.as_deref(),
            SyncProgress::RefSkipped {
                ref_name,
                reason: "cancelled".to_string(),
            },
        );
        return;
    }

    let content = match provider.read_file(&ref_name, &manifest_path).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            progress.record_skipped(format!("{ref_name}: no {manifest_path}"));
            emit(
                on_progress.as_deref(),
                SyncProgress::RefSkipped {
                    ref_name,
                    reason: format!("no {manifest_path}"),
                },
            );
            return;
        }
        Err(e) => {
            let error = short_error_message(&e);
            progress.record_failed(format!("{ref_name}: {error}"));
            emit(
                on_progress.as_deref(),
                SyncProgress::RefFailed { ref_name, error },
            );
            return;
        }
    };

    let doc = match parse_manifest(&content) {
        Ok(doc) => doc,
        Err(e) => {
            // Malformed manifests are skips, not failures: upstream content
            // problems are the publisher's to fix and must not fail the run.
            let reason = short_error_message(&e);
            progress.record_skipped(format!("{ref_name}: {reason}"));
            emit(
                on_progress.as_deref(),
                SyncProgress::RefSkipped { ref_name, reason },
            );
            return;
        }
    };

    let dist_url = doc.document["dist"]["url"].as_str().map(String::from);
    let persist = async {
        let package = store::packages::find_or_create(
            &db,
            org_id,
            repository_id,
            &doc.name,
            doc.description.clone(),
            &doc.package_type,
        )
        .await?;

        let model = PackageVersionActiveModel {
            package_id: Set(package.id),
            version: Set(change.derived.raw.clone()),
            normalized_version: Set(change.derived.normalized.clone()),
            manifest: Set(doc.document.clone()),
            source_url: Set(source_url.clone()),
            source_reference: Set(change.git_ref.sha.clone()),
            dist_url: Set(dist_url),
            released_at: Set(chrono::Utc::now().fixed_offset()),
            ..Default::default()
        };
        store::versions::upsert(&db, model).await
    };

    match persist.await {
        Ok(_) => {
            if existing {
                progress.record_updated();
            } else {
                progress.record_added();
            }
            emit(
                on_progress.as_deref(),
                SyncProgress::RefSynced {
                    ref_name,
                    version: change.derived.raw,
                    added: !existing,
                },
            );
        }
        Err(e) => {
            let error = short_error_message(&e);
            progress.record_failed(format!("{ref_name}: {error}"));
            emit(
                on_progress.as_deref(),
                SyncProgress::RefFailed { ref_name, error },
            );
        }
    }
}
