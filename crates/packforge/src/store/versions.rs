//! Package version row operations.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::package::{Column as PackageColumn, Entity as Package};
use crate::entity::package_version::{ActiveModel, Column, Entity as PackageVersion, Model};

use super::errors::{Result, StoreError};

/// Find a version by its UUID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>> {
    PackageVersion::find_by_id(id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find a version by its natural key (package + raw version string).
pub async fn find_by_version(
    db: &DatabaseConnection,
    package_id: Uuid,
    version: &str,
) -> Result<Option<Model>> {
    PackageVersion::find()
        .filter(Column::PackageId.eq(package_id))
        .filter(Column::Version.eq(version))
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// All versions of a package.
pub async fn find_by_package(db: &DatabaseConnection, package_id: Uuid) -> Result<Vec<Model>> {
    PackageVersion::find()
        .filter(Column::PackageId.eq(package_id))
        .order_by_asc(Column::NormalizedVersion)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// All versions across every package of a repository.
///
/// Stale pruning works repo-wide, so it needs the version rows of all
/// packages the repository ever produced, joined in one query.
pub async fn find_by_repository(
    db: &DatabaseConnection,
    repository_id: Uuid,
) -> Result<Vec<Model>> {
    PackageVersion::find()
        .inner_join(Package)
        .filter(PackageColumn::RepositoryId.eq(repository_id))
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Insert or update a version by its natural key (package_id + version).
///
/// On conflict the ref-derived fields are replaced: manifest, source URL
/// and commit, dist URL, release time and the normalized form. Identity
/// fields never change. Safe under concurrent writers; last write wins.
pub async fn upsert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    let package_id = required_active_value("package_id", &model.package_id)?;
    let version = required_active_value("version", &model.version)?;

    let mut insert_model = model;
    if insert_model.id.is_not_set() {
        insert_model.id = Set(Uuid::new_v4());
    }

    PackageVersion::insert(insert_model)
        .on_conflict(
            OnConflict::columns([Column::PackageId, Column::Version])
                .update_columns([
                    Column::NormalizedVersion,
                    Column::Manifest,
                    Column::SourceUrl,
                    Column::SourceReference,
                    Column::DistUrl,
                    Column::ReleasedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;

    find_by_version(db, package_id, &version)
        .await?
        .ok_or_else(|| {
            StoreError::invalid_input(format!("version {version} vanished after upsert"))
        })
}

/// Delete a version by its UUID.
///
/// Returns the number of rows deleted (0 or 1).
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<u64> {
    let result = PackageVersion::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}

fn required_active_value<T: Clone + Into<sea_orm::Value>>(
    field: &str,
    value: &ActiveValue<T>,
) -> Result<T> {
    match value {
        ActiveValue::Set(value) | ActiveValue::Unchanged(value) => Ok(value.clone()),
        ActiveValue::NotSet => Err(StoreError::invalid_input(format!(
            "Missing required field: {field}"
        ))),
    }
}
