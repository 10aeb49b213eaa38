//! Environment-backed credential store.
//!
//! The CLI is single-operator: every repository's provider calls
//! authenticate with the same environment-supplied credential, regardless
//! of which user connected the repository.

use async_trait::async_trait;
use packforge::entity::provider_kind::ProviderKind;
use packforge::provider::{Credential, CredentialStore};
use uuid::Uuid;

pub(crate) struct EnvCredentialStore {
    token: Option<String>,
    api_base: Option<String>,
    git_username: Option<String>,
    git_password: Option<String>,
}

impl EnvCredentialStore {
    pub(crate) fn from_env() -> Self {
        Self {
            token: std::env::var("PACKFORGE_API_TOKEN").ok(),
            api_base: std::env::var("PACKFORGE_API_BASE").ok(),
            git_username: std::env::var("PACKFORGE_GIT_USERNAME").ok(),
            git_password: std::env::var("PACKFORGE_GIT_PASSWORD").ok(),
        }
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn credential_for(&self, _owner: Uuid, kind: ProviderKind) -> Option<Credential> {
        match kind {
            ProviderKind::HostedApi => self.token.as_ref().map(|token| Credential {
                token: Some(token.clone()),
                api_base: self.api_base.clone(),
                ..Credential::default()
            }),
            ProviderKind::GenericGit => {
                if self.token.is_none() && self.git_username.is_none() {
                    return None;
                }
                Some(Credential {
                    token: self.token.clone(),
                    username: self.git_username.clone(),
                    password: self.git_password.clone(),
                    api_base: None,
                })
            }
        }
    }
}
