use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::provider_kind::ProviderKind;

use super::errors::Result;

/// A named pointer into a Git history plus the commit it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    /// Short ref name (`1.0.0`, `main`), without the `refs/...` prefix.
    pub name: String,
    /// Commit SHA the ref currently points at (peeled for annotated tags).
    pub sha: String,
}

impl GitRef {
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
        }
    }
}

/// An opaque credential payload resolved from the credential store.
///
/// Which fields are populated depends on the provider kind: hosted APIs
/// want `token` (and optionally `api_base` for self-hosted instances);
/// generic Git remotes want `token` or `username`/`password` for HTTP(S)
/// URL injection.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Base URL override for self-hosted API instances.
    pub api_base: Option<String>,
}

/// Read-only access to stored user credentials, keyed by (owner, provider).
///
/// The sync engine never mutates credentials; implementations live outside
/// the core (database-backed in the application, environment-backed in the
/// CLI, in-memory in tests).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn credential_for(&self, owner: Uuid, kind: ProviderKind) -> Option<Credential>;
}

/// Uniform capability surface over a repository's Git host.
///
/// # Implementation notes
///
/// Implementors should:
/// - Handle pagination internally for the list operations and return one
///   flat, de-duplicated list with peeled-tag markers (`^{}`) resolved
/// - Model a file absent at a ref as `Ok(None)` from `read_file`; error
///   types are reserved for genuine failures (auth, network, malformed
///   responses)
/// - Convert host-specific errors to `ProviderError`
#[async_trait]
pub trait GitProvider: Send + Sync {
    /// List all tags with the commit each one points at.
    async fn list_tags(&self) -> Result<Vec<GitRef>>;

    /// List all branches with the commit each one points at.
    async fn list_branches(&self) -> Result<Vec<GitRef>>;

    /// Read one file's content at a ref (name or commit SHA).
    ///
    /// Returns `Ok(None)` when the file does not exist at that ref.
    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>>;

    /// Check whether the configured credentials grant access.
    async fn validate_credentials(&self) -> Result<bool>;

    /// Clone-able URL used to populate version source metadata.
    fn repository_url(&self) -> String;
}

impl std::fmt::Debug for dyn GitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitProvider")
            .field("repository_url", &self.repository_url())
            .finish()
    }
}
