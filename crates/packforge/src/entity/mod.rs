//! SeaORM entity definitions for the packforge database schema.

pub mod package;
pub mod package_version;
pub mod prelude;
pub mod provider_kind;
pub mod repository;
pub mod run_status;
pub mod sync_log;
pub mod sync_status;
