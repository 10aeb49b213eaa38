//! Webhook signature verification and event mapping.
//!
//! Hosts deliver a `sha256=<hex>` HMAC-SHA256 signature over the raw
//! request body, keyed with the repository's configured shared secret.
//! Verification runs in constant time; callers must pass the body bytes
//! exactly as received, before any JSON decoding.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature header scheme prefix.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Why a webhook delivery was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The repository has no webhook secret configured.
    #[error("No webhook secret configured for this repository")]
    NotConfigured,

    /// The delivery carried no signature header.
    #[error("Missing signature header")]
    MissingSignature,

    /// The header is not of the form `sha256=<hex digest>`.
    #[error("Malformed signature header")]
    Malformed,

    /// The digest does not match the body under the configured secret.
    #[error("Signature mismatch")]
    Mismatch,
}

/// Verify a delivery's signature header against the raw body.
///
/// # Errors
/// Rejects when the repository has no secret, the header is absent or
/// malformed, or the digest does not match.
pub fn verify_signature(
    secret: Option<&str>,
    header: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let secret = secret.ok_or(SignatureError::NotConfigured)?;
    let header = header.ok_or(SignatureError::MissingSignature)?;

    let digest = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let digest = hex::decode(digest).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::NotConfigured)?;
    mac.update(body);
    mac.verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the signature header value for a body. Test and client helper.
#[must_use]
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// What a verified delivery asks the registry to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookTrigger {
    /// Connectivity check; acknowledge without syncing.
    Ping,
    /// Ref state changed upstream; schedule a sync run.
    SyncRequested,
    /// Event type the registry does not act on.
    Ignored,
}

/// Map a delivery's event name to the action it triggers.
///
/// Pushes, releases and ref deletions all funnel into a full sync run;
/// the run's own change detection works out what actually moved.
#[must_use]
pub fn map_event(event: &str) -> WebhookTrigger {
    match event {
        "ping" => WebhookTrigger::Ping,
        "push" | "release" | "delete" => WebhookTrigger::SyncRequested,
        _ => WebhookTrigger::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cret";
    const BODY: &[u8] = br#"{"ref":"refs/tags/v1.0.0"}"#;

    #[test]
    fn valid_signature_verifies() {
        let header = sign(SECRET, BODY);
        assert_eq!(verify_signature(Some(SECRET), Some(&header), BODY), Ok(()));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = sign(SECRET, BODY);
        let result = verify_signature(Some(SECRET), Some(&header), b"{}");
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = sign("other", BODY);
        let result = verify_signature(Some(SECRET), Some(&header), BODY);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn missing_secret_is_rejected_before_any_comparison() {
        let header = sign(SECRET, BODY);
        let result = verify_signature(None, Some(&header), BODY);
        assert_eq!(result, Err(SignatureError::NotConfigured));
    }

    #[test]
    fn missing_header_is_rejected() {
        let result = verify_signature(Some(SECRET), None, BODY);
        assert_eq!(result, Err(SignatureError::MissingSignature));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for header in ["sha1=abcdef", "deadbeef", "sha256=not-hex"] {
            assert_eq!(
                verify_signature(Some(SECRET), Some(header), BODY),
                Err(SignatureError::Malformed),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn event_mapping() {
        assert_eq!(map_event("ping"), WebhookTrigger::Ping);
        assert_eq!(map_event("push"), WebhookTrigger::SyncRequested);
        assert_eq!(map_event("release"), WebhookTrigger::SyncRequested);
        assert_eq!(map_event("delete"), WebhookTrigger::SyncRequested);
        assert_eq!(map_event("create"), WebhookTrigger::Ignored);
        assert_eq!(map_event("issues"), WebhookTrigger::Ignored);
    }
}
