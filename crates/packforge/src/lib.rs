//! Packforge - repository synchronization for a private package registry.
//!
//! This library keeps a registry's package catalog in step with the Git
//! repositories it was built from: it lists refs through a provider
//! abstraction, reads and validates `composer.json` manifests at changed
//! refs, derives and normalizes version identifiers, prunes versions whose
//! refs disappeared, and records every run in an immutable sync log.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use packforge::provider::ProviderRegistry;
//! use packforge::sync::{CancelToken, SyncOrchestrator};
//! use packforge::connect_and_migrate;
//!
//! let db = connect_and_migrate("sqlite://packforge.db?mode=rwc").await?;
//! let orchestrator = SyncOrchestrator::new(db, ProviderRegistry::with_defaults());
//!
//! let cancel = Arc::new(CancelToken::new());
//! let outcome = orchestrator
//!     .sync_repository(repo_id, &credential_store, cancel, None)
//!     .await?;
//! println!("added {} versions", outcome.counts.added);
//! ```

pub mod composer;
pub mod db;
pub mod entity;
pub mod migration;
pub mod provider;
pub mod retry;
pub mod store;
pub mod sync;
pub mod webhook;

pub use db::{connect, connect_and_migrate};
pub use entity::prelude::*;
pub use provider::{CredentialStore, GitProvider, GitRef, ProviderError, ProviderRegistry};
pub use store::StoreError;
pub use sync::{CancelToken, SyncOrchestrator, SyncOutcome};
pub use webhook::{map_event, verify_signature, SignatureError, WebhookTrigger};
