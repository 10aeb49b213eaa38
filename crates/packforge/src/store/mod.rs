//! Persistence layer: typed operations over the registry schema.
//!
//! Thin async functions over sea-orm, organized per table. Upserts target
//! the natural keys (`(org_id, name)` for packages, `(package_id, version)`
//! for versions) so concurrent sync tasks converge on one row.

pub mod errors;
pub mod packages;
pub mod repos;
pub mod sync_logs;
pub mod versions;

pub use errors::{Result, StoreError};
pub use sync_logs::LogCounts;
