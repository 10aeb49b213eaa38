//! Package entity - a named unit derived from a manifest's declared name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A package, unique per (organization, name).
///
/// Created lazily the first time a manifest with that name parses
/// successfully. The sync engine never deletes packages; only explicit user
/// action does.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization.
    pub org_id: Uuid,
    /// Repository this package was discovered in.
    pub repository_id: Uuid,

    /// Declared `vendor/package` name from the manifest.
    pub name: String,
    /// Manifest `description`, when present.
    pub description: Option<String>,
    /// Manifest `type`, defaulting to `library`.
    #[sea_orm(default_value = "library")]
    pub package_type: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repository::Entity",
        from = "Column::RepositoryId",
        to = "super::repository::Column::Id"
    )]
    Repository,
    #[sea_orm(has_many = "super::package_version::Entity")]
    PackageVersion,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl Related<super::package_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackageVersion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Split the declared name into (vendor, package).
    pub fn vendor_and_name(&self) -> Option<(&str, &str)> {
        self.name.split_once('/')
    }
}
