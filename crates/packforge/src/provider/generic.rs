//! Generic Git provider: any remote a `git` binary can reach.
//!
//! Ref listings shell out to `git ls-remote`; file reads shallow-clone the
//! requested ref into a temp directory that is removed when the guard
//! drops, whatever the outcome. No retry here: a remote that fails a
//! shallow clone fails the ref task.

use std::path::Path;
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command;
use url::Url;

use super::errors::{ProviderError, Result};
use super::types::{Credential, GitRef, GitProvider};

/// Provider for plain Git remotes without a host API.
pub struct GenericGitProvider {
    /// URL handed to git, with credentials injected for HTTP(S) remotes.
    remote_url: String,
    /// URL safe to log and store, never carrying credentials.
    display_url: String,
}

impl GenericGitProvider {
    /// Build a provider for one remote, injecting the credential into the
    /// URL when the scheme supports it.
    ///
    /// Credentials are only ever embedded into `http`/`https` URLs; SSH
    /// remotes rely on the ambient agent and file URLs need none.
    pub fn new(remote_url: &str, credential: Option<&Credential>) -> Result<Self> {
        let display_url = remote_url.to_string();

        let remote_url = match (credential, Url::parse(remote_url)) {
            (Some(cred), Ok(mut url)) if matches!(url.scheme(), "http" | "https") => {
                apply_credential(&mut url, cred);
                url.to_string()
            }
            _ => display_url.clone(),
        };

        Ok(Self {
            remote_url,
            display_url,
        })
    }

    /// Run `git ls-remote` against the remote and parse the ref table.
    async fn ls_remote(&self, flag: &str, prefix: &str) -> Result<Vec<GitRef>> {
        let stdout = run_git(
            "ls-remote",
            &["ls-remote", flag, &self.remote_url],
            None,
        )
        .await?;
        Ok(parse_ls_remote(&stdout, prefix))
    }
}

#[async_trait::async_trait]
impl GitProvider for GenericGitProvider {
    async fn list_tags(&self) -> Result<Vec<GitRef>> {
        self.ls_remote("--tags", "refs/tags/").await
    }

    async fn list_branches(&self) -> Result<Vec<GitRef>> {
        self.ls_remote("--heads", "refs/heads/").await
    }

    async fn read_file(&self, reference: &str, path: &str) -> Result<Option<String>> {
        // Guard removes the checkout on drop, including early returns.
        let checkout = TempDir::new()?;
        let target = checkout.path().to_string_lossy().to_string();

        run_git(
            "clone",
            &[
                "clone",
                "--depth",
                "1",
                "--branch",
                reference,
                "--quiet",
                &self.remote_url,
                &target,
            ],
            None,
        )
        .await?;

        match tokio::fs::read_to_string(checkout.path().join(path)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match run_git("ls-remote", &["ls-remote", &self.remote_url, "HEAD"], None).await {
            Ok(_) => Ok(true),
            Err(ProviderError::GitCommand { message, .. }) if looks_like_auth_failure(&message) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn repository_url(&self) -> String {
        self.display_url.clone()
    }
}

fn apply_credential(url: &mut Url, credential: &Credential) {
    match (&credential.username, &credential.password, &credential.token) {
        (Some(user), password, _) => {
            let _ = url.set_username(user);
            let _ = url.set_password(password.as_deref());
        }
        // A bare token rides as the username, which Git hosts accept for
        // HTTP(S) token auth.
        (None, _, Some(token)) => {
            let _ = url.set_username(token);
        }
        _ => {}
    }
}

/// Run one git command with prompts disabled, returning stdout.
pub(super) async fn run_git(operation: &str, args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let mut command = Command::new("git");
    command
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::GitCommand {
            operation: operation.to_string(),
            message: stderr.lines().next().unwrap_or("unknown error").to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `git ls-remote` output into refs under one prefix.
///
/// Annotated tags show up twice, once as the tag object and once peeled
/// (`name^{}`) to the commit; the peeled SHA wins.
fn parse_ls_remote(stdout: &str, prefix: &str) -> Vec<GitRef> {
    let mut refs: Vec<GitRef> = Vec::new();

    for line in stdout.lines() {
        let Some((sha, full_name)) = line.split_once('\t') else {
            continue;
        };
        let Some(name) = full_name.strip_prefix(prefix) else {
            continue;
        };

        if let Some(base) = name.strip_suffix("^{}") {
            if let Some(existing) = refs.iter_mut().find(|r| r.name == base) {
                existing.sha = sha.to_string();
            }
            continue;
        }

        refs.push(GitRef::new(name, sha));
    }

    refs
}

fn looks_like_auth_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("authentication failed")
        || lower.contains("could not read username")
        || lower.contains("403")
        || lower.contains("401")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_branch_listing() {
        let out = "aaa111\trefs/heads/main\nbbb222\trefs/heads/develop\n";
        let refs = parse_ls_remote(out, "refs/heads/");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], GitRef::new("main", "aaa111"));
        assert_eq!(refs[1], GitRef::new("develop", "bbb222"));
    }

    #[test]
    fn peeled_tag_sha_overrides_tag_object() {
        let out = concat!(
            "tagobj1\trefs/tags/v1.0.0\n",
            "commit1\trefs/tags/v1.0.0^{}\n",
            "commit2\trefs/tags/v1.1.0\n",
        );
        let refs = parse_ls_remote(out, "refs/tags/");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], GitRef::new("v1.0.0", "commit1"));
        assert_eq!(refs[1], GitRef::new("v1.1.0", "commit2"));
    }

    #[test]
    fn ignores_refs_outside_the_prefix() {
        let out = "aaa\trefs/heads/main\nbbb\trefs/tags/v1.0.0\n";
        let refs = parse_ls_remote(out, "refs/tags/");
        assert_eq!(refs, vec![GitRef::new("v1.0.0", "bbb")]);
    }

    #[test]
    fn injects_token_into_https_url() {
        let cred = Credential {
            token: Some("sekrit".to_string()),
            ..Credential::default()
        };
        let provider =
            GenericGitProvider::new("https://git.example.com/acme/widgets.git", Some(&cred))
                .expect("should build");
        assert!(provider.remote_url.contains("sekrit@"));
        // The display URL never carries the credential.
        assert_eq!(
            provider.repository_url(),
            "https://git.example.com/acme/widgets.git"
        );
    }

    #[test]
    fn leaves_ssh_urls_untouched() {
        let cred = Credential {
            token: Some("sekrit".to_string()),
            ..Credential::default()
        };
        let provider =
            GenericGitProvider::new("git@git.example.com:acme/widgets.git", Some(&cred))
                .expect("should build");
        assert_eq!(provider.remote_url, "git@git.example.com:acme/widgets.git");
    }

    #[test]
    fn username_password_pair_wins_over_token() {
        let cred = Credential {
            token: Some("unused".to_string()),
            username: Some("bot".to_string()),
            password: Some("hunter2".to_string()),
            api_base: None,
        };
        let provider =
            GenericGitProvider::new("https://git.example.com/acme/widgets.git", Some(&cred))
                .expect("should build");
        assert!(provider.remote_url.contains("bot:hunter2@"));
    }

    #[test]
    fn auth_failure_heuristic() {
        assert!(looks_like_auth_failure(
            "fatal: Authentication failed for 'https://example.com/r.git/'"
        ));
        assert!(looks_like_auth_failure(
            "fatal: could not read Username for 'https://example.com'"
        ));
        assert!(!looks_like_auth_failure("fatal: repository not found"));
    }
}
