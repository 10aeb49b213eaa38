//! Common re-exports for convenient entity usage.

pub use super::package::{
    ActiveModel as PackageActiveModel, Column as PackageColumn, Entity as Package,
    Model as PackageModel,
};
pub use super::package_version::{
    ActiveModel as PackageVersionActiveModel, Column as PackageVersionColumn,
    Entity as PackageVersion, Model as PackageVersionModel,
};
pub use super::provider_kind::ProviderKind;
pub use super::repository::{
    ActiveModel as RepositoryActiveModel, Column as RepositoryColumn, Entity as Repository,
    Model as RepositoryModel,
};
pub use super::run_status::RunStatus;
pub use super::sync_log::{
    ActiveModel as SyncLogActiveModel, Column as SyncLogColumn, Entity as SyncLog,
    Model as SyncLogModel,
};
pub use super::sync_status::SyncStatus;
