//! Package row operations.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::package::{ActiveModel, Column, Entity as Package, Model};

use super::errors::{Result, StoreError};

/// Find a package by its UUID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>> {
    Package::find_by_id(id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find a package by its natural key (org_id + declared name).
pub async fn find_by_name(
    db: &DatabaseConnection,
    org_id: Uuid,
    name: &str,
) -> Result<Option<Model>> {
    Package::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// All packages discovered in a repository.
pub async fn find_by_repository(
    db: &DatabaseConnection,
    repository_id: Uuid,
) -> Result<Vec<Model>> {
    Package::find()
        .filter(Column::RepositoryId.eq(repository_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Find the package for an org/name pair, creating it when absent.
///
/// Concurrent tasks syncing refs of the same repository race to create the
/// package; the insert is ON CONFLICT DO NOTHING on the natural key so the
/// first writer wins and everyone reads the surviving row back.
pub async fn find_or_create(
    db: &DatabaseConnection,
    org_id: Uuid,
    repository_id: Uuid,
    name: &str,
    description: Option<String>,
    package_type: &str,
) -> Result<Model> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        org_id: Set(org_id),
        repository_id: Set(repository_id),
        name: Set(name.to_string()),
        description: Set(description),
        package_type: Set(package_type.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
    };

    Package::insert(model)
        .on_conflict(
            OnConflict::columns([Column::OrgId, Column::Name])
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;

    find_by_name(db, org_id, name)
        .await?
        .ok_or_else(|| StoreError::invalid_input(format!("package {name} vanished after insert")))
}

/// Delete a package by its UUID. Cascades to its versions.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<u64> {
    let result = Package::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
