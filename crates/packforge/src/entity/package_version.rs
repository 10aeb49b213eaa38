//! PackageVersion entity - one ref's resolved state for a package.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A resolved package version, unique per (package, raw version string).
///
/// `normalized_version` is computed once by the version normalizer at write
/// time and treated as authoritative afterward; nothing else in the system
/// recomputes it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "package_versions")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning package.
    pub package_id: Uuid,

    /// Raw version as presented to consumers (`"1.2.3"`, `"dev-main"`).
    pub version: String,
    /// Canonical comparable form (`"1.2.3.0"`, `"dev-main"`).
    pub normalized_version: String,

    /// Full manifest document read at the backing ref.
    #[sea_orm(column_type = "Json")]
    pub manifest: Json,

    /// Clone-able URL of the source repository.
    #[sea_orm(column_type = "Text")]
    pub source_url: String,
    /// Commit SHA the backing ref resolved to at sync time.
    pub source_reference: String,
    /// Optional distribution archive URL.
    #[sea_orm(column_type = "Text", nullable)]
    pub dist_url: Option<String>,

    pub released_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::package::Entity",
        from = "Column::PackageId",
        to = "super::package::Column::Id"
    )]
    Package,
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this version counts as stable for consumers.
    pub fn is_stable(&self) -> bool {
        crate::composer::version::is_stable(&self.version)
    }
}
