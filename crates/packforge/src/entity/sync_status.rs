//! Sync status enum for a repository's most recent run outcome.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of the most recent sync run, as shown on the repository row.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SyncStatus {
    #[sea_orm(string_value = "ok")]
    Ok,
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Newly connected or a run is currently in flight.
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Ok => write!(f, "ok"),
            SyncStatus::Failed => write!(f, "failed"),
            SyncStatus::Pending => write!(f, "pending"),
        }
    }
}
