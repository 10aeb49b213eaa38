//! Provider registry: maps a repository's provider kind to a constructor.
//!
//! The registry is the only place that knows how to turn a stored
//! repository row plus a credential into a live [`GitProvider`]. New
//! provider kinds register a constructor; everything downstream works
//! against the trait.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::provider_kind::ProviderKind;
use crate::entity::repository;

use super::errors::{ProviderError, Result};
use super::generic::GenericGitProvider;
use super::hosted::HostedApiProvider;
use super::types::{Credential, CredentialStore, GitProvider};

type Constructor = Box<
    dyn Fn(&repository::Model, Option<Credential>) -> Result<Arc<dyn GitProvider>> + Send + Sync,
>;

/// Registry of provider constructors keyed by kind.
pub struct ProviderRegistry {
    constructors: HashMap<ProviderKind, Constructor>,
}

impl ProviderRegistry {
    /// An empty registry. Useful in tests that register scripted providers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// The standard registry with the built-in provider kinds.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(ProviderKind::HostedApi, |repo, credential| {
            let credential = credential.ok_or(ProviderError::MissingCredentials {
                owner: repo.credential_owner_id,
                kind: ProviderKind::HostedApi,
            })?;
            Ok(Arc::new(HostedApiProvider::new(&repo.remote_id, &credential)?))
        });

        // Generic remotes may be public; a missing credential is fine.
        registry.register(ProviderKind::GenericGit, |repo, credential| {
            Ok(Arc::new(GenericGitProvider::new(
                &repo.remote_id,
                credential.as_ref(),
            )?))
        });

        registry
    }

    /// Register (or replace) the constructor for a kind.
    pub fn register<F>(&mut self, kind: ProviderKind, constructor: F)
    where
        F: Fn(&repository::Model, Option<Credential>) -> Result<Arc<dyn GitProvider>>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Resolve a live provider for a repository row.
    ///
    /// Looks up the credential for the repository's credential owner and
    /// hands it to the registered constructor.
    ///
    /// # Errors
    /// `NotImplemented` when no constructor is registered for the kind;
    /// otherwise whatever the constructor reports (missing credentials,
    /// invalid token, ...).
    pub async fn resolve(
        &self,
        repo: &repository::Model,
        credentials: &dyn CredentialStore,
    ) -> Result<Arc<dyn GitProvider>> {
        let constructor = self
            .constructors
            .get(&repo.provider)
            .ok_or(ProviderError::NotImplemented {
                kind: repo.provider,
            })?;

        let credential = credentials
            .credential_for(repo.credential_owner_id, repo.provider)
            .await;

        constructor(repo, credential)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::entity::sync_status::SyncStatus;

    use super::*;

    struct EmptyStore;

    #[async_trait]
    impl CredentialStore for EmptyStore {
        async fn credential_for(&self, _owner: Uuid, _kind: ProviderKind) -> Option<Credential> {
            None
        }
    }

    struct TokenStore(&'static str);

    #[async_trait]
    impl CredentialStore for TokenStore {
        async fn credential_for(&self, _owner: Uuid, _kind: ProviderKind) -> Option<Credential> {
            Some(Credential {
                token: Some(self.0.to_string()),
                ..Credential::default()
            })
        }
    }

    fn repo(provider: ProviderKind, remote_id: &str) -> repository::Model {
        repository::Model {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            provider,
            remote_id: remote_id.to_string(),
            default_branch: None,
            last_synced_at: None,
            sync_status: SyncStatus::Pending,
            webhook_secret: None,
            credential_owner_id: Uuid::new_v4(),
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn hosted_without_credentials_is_an_error() {
        let registry = ProviderRegistry::with_defaults();
        let repo = repo(ProviderKind::HostedApi, "acme/widgets");
        let err = registry
            .resolve(&repo, &EmptyStore)
            .await
            .expect_err("no credential stored");
        assert!(matches!(err, ProviderError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn hosted_with_token_resolves() {
        let registry = ProviderRegistry::with_defaults();
        let repo = repo(ProviderKind::HostedApi, "acme/widgets");
        let provider = registry
            .resolve(&repo, &TokenStore("t"))
            .await
            .expect("should resolve");
        assert_eq!(provider.repository_url(), "https://github.com/acme/widgets.git");
    }

    #[tokio::test]
    async fn generic_without_credentials_resolves() {
        let registry = ProviderRegistry::with_defaults();
        let repo = repo(
            ProviderKind::GenericGit,
            "https://git.example.com/acme/widgets.git",
        );
        let provider = registry
            .resolve(&repo, &EmptyStore)
            .await
            .expect("public remote needs no credential");
        assert_eq!(
            provider.repository_url(),
            "https://git.example.com/acme/widgets.git"
        );
    }

    #[tokio::test]
    async fn unregistered_kind_reports_not_implemented() {
        let registry = ProviderRegistry::new();
        let repo = repo(ProviderKind::HostedApi, "acme/widgets");
        let err = registry
            .resolve(&repo, &EmptyStore)
            .await
            .expect_err("empty registry");
        assert!(matches!(err, ProviderError::NotImplemented { .. }));
    }
}
