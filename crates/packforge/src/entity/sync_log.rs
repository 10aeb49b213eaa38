//! SyncLog entity - the immutable audit record of one orchestrated run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::run_status::RunStatus;

/// One record per orchestrated sync run.
///
/// Created with status `pending` at run start and finalized exactly once at
/// run completion. Ordinary sync operations must never delete these rows.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_logs")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Repository this run belonged to.
    pub repository_id: Uuid,
    /// Batch identifier shared by the run's per-ref tasks.
    pub batch_id: Option<Uuid>,

    pub status: RunStatus,
    pub started_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
    /// Run-fatal error, when the run failed before tasks could settle.
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub added: i32,
    pub updated: i32,
    pub skipped: i32,
    pub failed: i32,
    pub removed: i32,

    /// Free-form per-ref detail (skip reasons, task failures).
    #[sea_orm(column_type = "Json")]
    pub details: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repository::Entity",
        from = "Column::RepositoryId",
        to = "super::repository::Column::Id"
    )]
    Repository,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
