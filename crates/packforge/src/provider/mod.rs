//! Git provider abstraction and its built-in implementations.
//!
//! A [`GitProvider`] exposes the four operations the sync engine needs
//! from any host: list tags, list branches, read one file at a ref, and a
//! credential check. The [`ProviderRegistry`] turns stored repository rows
//! into live providers.

pub mod errors;
pub mod factory;
pub mod generic;
pub mod hosted;
pub mod local;
pub mod types;

pub use errors::{short_error_message, ProviderError, Result};
pub use factory::ProviderRegistry;
pub use generic::GenericGitProvider;
pub use hosted::HostedApiProvider;
pub use local::CachedLocalProvider;
pub use types::{Credential, CredentialStore, GitProvider, GitRef};
