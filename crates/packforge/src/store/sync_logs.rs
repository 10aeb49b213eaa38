//! Sync log row operations.
//!
//! Logs are append-then-finalize: a pending row is created at run start
//! and completed exactly once when the run settles. Nothing in the sync
//! path deletes them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::run_status::RunStatus;
use crate::entity::sync_log::{ActiveModel, Column, Entity as SyncLog, Model};

use super::errors::{Result, StoreError};

/// Aggregated counters recorded when a run is finalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCounts {
    pub added: i32,
    pub updated: i32,
    pub skipped: i32,
    pub failed: i32,
    pub removed: i32,
}

/// Create the pending log row that marks a run as started.
pub async fn create_pending(
    db: &DatabaseConnection,
    repository_id: Uuid,
    batch_id: Option<Uuid>,
) -> Result<Model> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        repository_id: Set(repository_id),
        batch_id: Set(batch_id),
        status: Set(RunStatus::Pending),
        started_at: Set(Utc::now().fixed_offset()),
        completed_at: Set(None),
        error_message: Set(None),
        added: Set(0),
        updated: Set(0),
        skipped: Set(0),
        failed: Set(0),
        removed: Set(0),
        details: Set(serde_json::json!([])),
    };
    model.insert(db).await.map_err(StoreError::from)
}

/// Finalize a pending log row with the run's outcome.
pub async fn finalize(
    db: &DatabaseConnection,
    id: Uuid,
    status: RunStatus,
    counts: LogCounts,
    error_message: Option<String>,
    details: serde_json::Value,
) -> Result<Model> {
    let model = ActiveModel {
        id: Set(id),
        status: Set(status),
        completed_at: Set(Some(Utc::now().fixed_offset())),
        error_message: Set(error_message),
        added: Set(counts.added),
        updated: Set(counts.updated),
        skipped: Set(counts.skipped),
        failed: Set(counts.failed),
        removed: Set(counts.removed),
        details: Set(details),
        ..Default::default()
    };
    model.update(db).await.map_err(StoreError::from)
}

/// Find a log row by its UUID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>> {
    SyncLog::find_by_id(id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// A repository's run history, newest first.
pub async fn find_by_repository(
    db: &DatabaseConnection,
    repository_id: Uuid,
    limit: Option<u64>,
) -> Result<Vec<Model>> {
    let mut query = SyncLog::find()
        .filter(Column::RepositoryId.eq(repository_id))
        .order_by_desc(Column::StartedAt);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    query.all(db).await.map_err(StoreError::from)
}

/// All runs that shared a batch.
pub async fn find_by_batch(db: &DatabaseConnection, batch_id: Uuid) -> Result<Vec<Model>> {
    SyncLog::find()
        .filter(Column::BatchId.eq(batch_id))
        .order_by_asc(Column::StartedAt)
        .all(db)
        .await
        .map_err(StoreError::from)
}
