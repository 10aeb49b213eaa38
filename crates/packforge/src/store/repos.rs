//! Repository row operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::repository::{ActiveModel, Column, Entity as Repository, Model};
use crate::entity::sync_status::SyncStatus;

use super::errors::{Result, StoreError};

/// Insert a new repository.
pub async fn insert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.insert(db).await.map_err(StoreError::from)
}

/// Find a repository by its UUID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>> {
    Repository::find_by_id(id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find a repository by its UUID, erroring when absent.
pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| StoreError::not_found_by_id("repository", id))
}

/// All repositories owned by an organization.
pub async fn find_by_org(db: &DatabaseConnection, org_id: Uuid) -> Result<Vec<Model>> {
    Repository::find()
        .filter(Column::OrgId.eq(org_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// All connected repositories, oldest first.
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>> {
    Repository::find()
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Record the outcome of a sync run on the repository row.
///
/// Sets `sync_status` and stamps `last_synced_at` with the current time.
pub async fn set_sync_state(
    db: &DatabaseConnection,
    id: Uuid,
    status: SyncStatus,
) -> Result<Model> {
    let model = ActiveModel {
        id: Set(id),
        sync_status: Set(status),
        last_synced_at: Set(Some(Utc::now().fixed_offset())),
        ..Default::default()
    };
    model.update(db).await.map_err(StoreError::from)
}

/// Delete a repository by its UUID. Cascades to packages, versions and logs.
///
/// Returns the number of rows deleted (0 or 1).
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<u64> {
    let result = Repository::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
