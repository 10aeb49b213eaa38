//! Repository entity - a connected Git source owned by an organization.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider_kind::ProviderKind;
use crate::entity::sync_status::SyncStatus;

/// A Git repository connected to the registry.
///
/// The sync engine mutates `last_synced_at` and `sync_status` on every run;
/// everything else is set when the organization connects the repository.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repositories")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization.
    pub org_id: Uuid,
    /// How the registry talks to this repository's host.
    pub provider: ProviderKind,
    /// Host-specific identifier: `"owner/name"` for hosted APIs, a clone URL
    /// for generic Git remotes.
    pub remote_id: String,
    /// Default branch, when known.
    pub default_branch: Option<String>,

    /// When the last sync run finished.
    pub last_synced_at: Option<DateTimeWithTimeZone>,
    /// Outcome of the last sync run.
    pub sync_status: SyncStatus,

    /// Shared secret for webhook signature verification, if configured.
    pub webhook_secret: Option<String>,
    /// Which user's stored credentials authenticate provider calls.
    pub credential_owner_id: Uuid,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::package::Entity")]
    Package,
    #[sea_orm(has_many = "super::sync_log::Entity")]
    SyncLog,
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl Related<super::sync_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SyncLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
