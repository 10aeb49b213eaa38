//! Hosted-API provider: GitHub-compatible REST endpoints over reqwest.
//!
//! Authenticates with a bearer token from the stored credential, paginates
//! ref listings transparently, and applies a small bounded retry to every
//! call so transient host failures do not abort a sync run.

use std::collections::HashSet;
use std::time::Duration;

use backon::Retryable;
use base64::Engine as _;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::retry::provider_backoff;

use super::errors::{ProviderError, Result};
use super::types::{Credential, GitRef, GitProvider};

/// Default API base when the credential carries no override.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Per-request timeout, independent of overall batch duration.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for ref listings.
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct RefEntry {
    name: String,
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    content: Option<String>,
    encoding: Option<String>,
}

/// Provider backed by a GitHub-compatible hosted REST API.
#[derive(Clone, Debug)]
pub struct HostedApiProvider {
    http: reqwest::Client,
    api_base: String,
    web_base: String,
    /// `owner/name` on the host.
    remote_id: String,
    token: String,
}

impl HostedApiProvider {
    /// Build a provider for one repository from its resolved credential.
    ///
    /// # Errors
    /// Returns `ProviderError::Auth` when the credential carries no token.
    pub fn new(remote_id: &str, credential: &Credential) -> Result<Self> {
        let token = credential
            .token
            .clone()
            .ok_or_else(|| ProviderError::auth("stored credential has no API token"))?;

        let api_base = credential
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = api_base.trim_end_matches('/').to_string();
        let web_base = web_base_for(&api_base);

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent("packforge-sync")
            .build()?;

        Ok(Self {
            http,
            api_base,
            web_base,
            remote_id: remote_id.to_string(),
            token,
        })
    }

    /// Issue one GET with bearer auth, bounded retry on transient errors.
    async fn get(&self, path_and_query: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.api_base, path_and_query);

        let operation = || async {
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header(ACCEPT, "application/vnd.github+json")
                .send()
                .await?;
            map_status(response).await
        };

        operation
            .retry(provider_backoff())
            .when(ProviderError::is_transient)
            .notify(|err, dur| {
                tracing::debug!(url = %url, delay_ms = dur.as_millis() as u64, error = %err, "Retrying provider call");
            })
            .await
    }

    /// Fetch every page of a ref-listing endpoint into one de-duplicated list.
    async fn list_refs(&self, endpoint: &str) -> Result<Vec<GitRef>> {
        let mut refs = Vec::new();
        let mut seen = HashSet::new();

        for page in 1u32.. {
            let response = self
                .get(&format!(
                    "/repos/{}/{}?per_page={}&page={}",
                    self.remote_id, endpoint, PER_PAGE, page
                ))
                .await?;

            let entries: Vec<RefEntry> = response
                .json()
                .await
                .map_err(|e| ProviderError::api(200, format!("malformed {endpoint} response: {e}")))?;
            let page_len = entries.len();

            for entry in entries {
                // Peeled-tag markers are an artifact of ref enumeration,
                // not refs of their own.
                if entry.name.ends_with("^{}") {
                    continue;
                }
                if seen.insert(entry.name.clone()) {
                    refs.push(GitRef::new(entry.name, entry.commit.sha));
                }
            }

            if page_len < PER_PAGE {
                break;
            }
        }

        Ok(refs)
    }
}

#[async_trait::async_trait]
impl GitProvider for HostedApiProvider {
    async fn list_tags(&self) -> Result<Vec<GitRef>> {
        self.list_refs("tags").await
    }

    async fn list_branches(&self) -> Result<Vec<GitRef>> {
        self.list_refs("branches").await
    }

    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>> {
        let response = match self
            .get(&format!(
                "/repos/{}/contents/{}?ref={}",
                self.remote_id, path, reference
            ))
            .await
        {
            Ok(response) => response,
            // Absent file at this ref is a normal outcome, not a failure.
            Err(ProviderError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let entry: ContentsEntry = response
            .json()
            .await
            .map_err(|e| ProviderError::api(200, format!("malformed contents response: {e}")))?;

        match entry.encoding.as_deref() {
            Some("base64") => {}
            other => {
                return Err(ProviderError::api(
                    200,
                    format!("unexpected contents encoding: {:?}", other),
                ))
            }
        }
        let encoded: String = entry
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ProviderError::api(200, format!("invalid base64 content: {e}")))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| ProviderError::api(200, format!("non-UTF-8 file content: {e}")))?;

        Ok(Some(content))
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self.get(&format!("/repos/{}", self.remote_id)).await {
            Ok(_) => Ok(true),
            Err(ProviderError::Auth { .. }) | Err(ProviderError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn repository_url(&self) -> String {
        format!("{}/{}.git", self.web_base, self.remote_id)
    }
}

/// Map a response status to the provider error taxonomy.
///
/// 4xx other than not-found/rate-limit are final API errors; 5xx are
/// transient and eligible for retry.
async fn map_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let reset_at = response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));
    let message = response.text().await.unwrap_or_default();
    let message = message.lines().next().unwrap_or("").to_string();

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::auth(message),
        StatusCode::NOT_FOUND => ProviderError::not_found(url),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { reset_at },
        _ => ProviderError::api(status.as_u16(), message),
    })
}

/// Derive the web/clone base from an API base.
///
/// `https://api.github.com` maps to `https://github.com`; self-hosted
/// instances mounted at `/api/v3` (GitHub Enterprise convention) map to
/// their root; anything else is used as-is.
fn web_base_for(api_base: &str) -> String {
    if api_base == DEFAULT_API_BASE {
        return "https://github.com".to_string();
    }
    api_base
        .trim_end_matches("/api/v3")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(token: &str) -> Credential {
        Credential {
            token: Some(token.to_string()),
            ..Credential::default()
        }
    }

    #[test]
    fn requires_a_token() {
        let err = HostedApiProvider::new("acme/widgets", &Credential::default())
            .expect_err("missing token should fail");
        assert!(matches!(err, ProviderError::Auth { .. }));
    }

    #[test]
    fn repository_url_for_default_host() {
        let provider =
            HostedApiProvider::new("acme/widgets", &credential("t")).expect("should build");
        assert_eq!(provider.repository_url(), "https://github.com/acme/widgets.git");
    }

    #[test]
    fn repository_url_for_enterprise_host() {
        let mut cred = credential("t");
        cred.api_base = Some("https://git.example.com/api/v3".to_string());
        let provider = HostedApiProvider::new("acme/widgets", &cred).expect("should build");
        assert_eq!(
            provider.repository_url(),
            "https://git.example.com/acme/widgets.git"
        );
    }

    #[test]
    fn web_base_trims_trailing_slash() {
        assert_eq!(web_base_for("https://git.example.com"), "https://git.example.com");
        assert_eq!(
            web_base_for("https://git.example.com/api/v3"),
            "https://git.example.com"
        );
    }
}
