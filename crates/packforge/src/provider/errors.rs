use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::entity::provider_kind::ProviderKind;

/// Errors that can occur when talking to a Git provider.
///
/// Provider errors are run-fatal at the orchestrator level: a repository
/// whose host cannot be listed finalizes its run as failed. Note that a
/// file being absent at a ref is *not* an error - `read_file` models that
/// as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication failed or the token is invalid.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// Resource not found (repository, ref, ...).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The host's API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The operation is not supported by this provider variant.
    #[error("Operation {operation} is not supported by the {provider} provider")]
    Unsupported {
        operation: &'static str,
        provider: &'static str,
    },

    /// No constructor is registered for this provider kind.
    #[error("Provider not implemented: {kind}")]
    NotImplemented { kind: ProviderKind },

    /// No stored credential exists for the (owner, provider) pair.
    #[error("No stored credentials for provider {kind} (owner {owner})")]
    MissingCredentials { owner: Uuid, kind: ProviderKind },

    /// A git invocation failed.
    #[error("git {operation} failed: {message}")]
    GitCommand { operation: String, message: String },

    /// Local I/O failure (temp dirs, reading cloned files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Create an authentication error.
    #[inline]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an API error.
    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether retrying this error may help (transport failures, 5xx,
    /// rate limits). Auth failures and plain 4xx responses are final.
    #[inline]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network {
            message: err.to_string(),
        }
    }
}

/// Extract a short error message suitable for per-ref detail logs.
///
/// Takes the first line of the error message, which keeps multi-line git
/// stderr and backtraced errors readable in the sync log details blob.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ProviderError::network("connection reset").is_transient());
        assert!(ProviderError::RateLimited { reset_at: None }.is_transient());
        assert!(ProviderError::api(502, "bad gateway").is_transient());
        assert!(!ProviderError::api(422, "unprocessable").is_transient());
        assert!(!ProviderError::auth("bad token").is_transient());
        assert!(!ProviderError::not_found("org/repo").is_transient());
    }

    #[test]
    fn missing_credentials_names_the_pair() {
        let owner = Uuid::new_v4();
        let err = ProviderError::MissingCredentials {
            owner,
            kind: ProviderKind::HostedApi,
        };
        let msg = err.to_string();
        assert!(msg.contains("hosted-api"));
        assert!(msg.contains(&owner.to_string()));
    }

    #[test]
    fn unsupported_names_operation_and_provider() {
        let err = ProviderError::Unsupported {
            operation: "list_tags",
            provider: "cached-local",
        };
        let msg = err.to_string();
        assert!(msg.contains("list_tags"));
        assert!(msg.contains("cached-local"));
    }

    #[test]
    fn short_error_message_takes_first_line() {
        let err = std::io::Error::other("fatal: repository not found\nhint: check the URL");
        assert_eq!(short_error_message(&err), "fatal: repository not found");
    }
}
