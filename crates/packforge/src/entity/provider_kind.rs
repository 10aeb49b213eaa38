//! Provider kind enum for type-safe Git host handling.
//!
//! This represents how the registry talks to a repository's host, not a
//! specific deployment. A GitHub Enterprise instance and github.com are both
//! `HostedApi`; anything reachable only through plain Git tooling is
//! `GenericGit`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supported Git provider kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ProviderKind {
    /// A host with a REST API (GitHub-compatible contents/refs endpoints).
    #[sea_orm(string_value = "hosted-api")]
    HostedApi,
    /// A plain Git remote driven through the `git` binary.
    #[sea_orm(string_value = "generic-git")]
    GenericGit,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::HostedApi => write!(f, "hosted-api"),
            ProviderKind::GenericGit => write!(f, "generic-git"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hosted-api" | "hosted" => Ok(ProviderKind::HostedApi),
            "generic-git" | "git" => Ok(ProviderKind::GenericGit),
            _ => Err(format!("Unknown provider kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ProviderKind::HostedApi.to_string(), "hosted-api");
        assert_eq!(ProviderKind::GenericGit.to_string(), "generic-git");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "hosted-api".parse::<ProviderKind>().unwrap(),
            ProviderKind::HostedApi
        );
        assert_eq!(
            "git".parse::<ProviderKind>().unwrap(),
            ProviderKind::GenericGit
        );
        assert!("svn".parse::<ProviderKind>().is_err());
    }
}
