//! Cached-local provider: reads from an existing on-disk clone.
//!
//! Used when a mirror of the repository is already maintained out of band.
//! File reads go through `git show` against the local object store; ref
//! listing is out of scope for this variant and reports `Unsupported`, so
//! a repository configured this way can serve manifest reads but cannot
//! drive change detection on its own.

use std::path::{Path, PathBuf};

use super::errors::{ProviderError, Result};
use super::generic::run_git;
use super::types::{GitRef, GitProvider};

const PROVIDER_NAME: &str = "cached-local";

/// Provider over a pre-existing local clone.
pub struct CachedLocalProvider {
    clone_dir: PathBuf,
}

impl CachedLocalProvider {
    pub fn new(clone_dir: impl Into<PathBuf>) -> Self {
        Self {
            clone_dir: clone_dir.into(),
        }
    }

    pub fn clone_dir(&self) -> &Path {
        &self.clone_dir
    }
}

#[async_trait::async_trait]
impl GitProvider for CachedLocalProvider {
    async fn list_tags(&self) -> Result<Vec<GitRef>> {
        Err(ProviderError::Unsupported {
            operation: "list_tags",
            provider: PROVIDER_NAME,
        })
    }

    async fn list_branches(&self) -> Result<Vec<GitRef>> {
        Err(ProviderError::Unsupported {
            operation: "list_branches",
            provider: PROVIDER_NAME,
        })
    }

    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>> {
        let object = format!("{reference}:{path}");
        match run_git("show", &["show", &object], Some(&self.clone_dir)).await {
            Ok(content) => Ok(Some(content)),
            // git show reports a missing path (or ref) on stderr; absent
            // content is a normal outcome for read_file.
            Err(ProviderError::GitCommand { message, .. })
                if message.contains("does not exist")
                    || message.contains("exists on disk, but not in") =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        // No credentials involved; the clone is usable iff it is a git dir.
        match run_git(
            "rev-parse",
            &["rev-parse", "--is-inside-work-tree"],
            Some(&self.clone_dir),
        )
        .await
        {
            Ok(_) => Ok(true),
            Err(ProviderError::GitCommand { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn repository_url(&self) -> String {
        self.clone_dir.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_is_unsupported() {
        let provider = CachedLocalProvider::new("/var/cache/mirrors/widgets");
        let err = provider.list_tags().await.expect_err("should not list");
        assert!(matches!(
            err,
            ProviderError::Unsupported {
                operation: "list_tags",
                ..
            }
        ));
    }

    #[test]
    fn repository_url_is_the_clone_path() {
        let provider = CachedLocalProvider::new("/var/cache/mirrors/widgets");
        assert_eq!(provider.repository_url(), "/var/cache/mirrors/widgets");
    }
}
