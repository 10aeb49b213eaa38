//! Version derivation and normalization from Git ref names.
//!
//! The derived raw version is the consumer-facing string stored on a
//! package version row; the normalized form is the canonical 4-component
//! comparable shape used for ordering. Normalization happens here and only
//! here - once stored, the normalized version is authoritative.

/// Whether a ref is a tag or a branch.
///
/// Branches always derive a `dev-` version regardless of how they are
/// named, so a branch called `1.0.0` and a tag called `v1.0.0` produce
/// distinct raw versions and never mask each other during change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Tag,
    Branch,
}

/// A derived (raw, normalized) version pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedVersion {
    /// Display form: `"1.2.3"` or `"dev-main"`.
    pub raw: String,
    /// Canonical comparable form: `"1.2.3.0"` or `"dev-main"`.
    pub normalized: String,
}

impl DerivedVersion {
    fn dev(ref_name: &str) -> Self {
        let raw = format!("dev-{ref_name}");
        Self {
            normalized: raw.clone(),
            raw,
        }
    }
}

/// Derive the raw and normalized version for a ref.
///
/// Tags: a leading literal `v` followed by a digit is stripped
/// (`v1.0.0` -> `1.0.0`); a numeric-dotted candidate normalizes to four
/// zero-padded components. Anything that fails either step falls back to
/// the development form `dev-<refName>` rather than raising. Branches go
/// straight to the development form.
pub fn derive_version(kind: RefKind, ref_name: &str) -> DerivedVersion {
    if kind == RefKind::Branch {
        return DerivedVersion::dev(ref_name);
    }

    let candidate = strip_v_prefix(ref_name);
    match normalize_numeric(candidate) {
        Some(normalized) => DerivedVersion {
            raw: candidate.to_string(),
            normalized,
        },
        None => DerivedVersion::dev(ref_name),
    }
}

/// Strip a leading `v` only when a digit follows (`v1.0` -> `1.0`, but
/// `version-x` stays untouched).
fn strip_v_prefix(name: &str) -> &str {
    match name.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => name,
    }
}

/// Normalize a numeric-dotted candidate to four components.
///
/// Accepts 2 to 4 dot-separated decimal components (`1.2` -> `1.2.0.0`,
/// `1.2.3.4` stays). Returns `None` for anything else, including
/// numeric-looking strings with overflowing or non-decimal components.
fn normalize_numeric(candidate: &str) -> Option<String> {
    let parts: Vec<&str> = candidate.split('.').collect();
    if parts.len() < 2 || parts.len() > 4 {
        return None;
    }

    let mut components = [0u64; 4];
    for (slot, part) in components.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }

    Some(format!(
        "{}.{}.{}.{}",
        components[0], components[1], components[2], components[3]
    ))
}

/// Stability classification for a raw version string.
///
/// A version is stable iff it does not contain `dev` and begins with
/// `<digits>.<digits>`. This is derived on demand, never stored.
pub fn is_stable(raw: &str) -> bool {
    if raw.contains("dev") {
        return false;
    }
    let mut chars = raw.chars();
    let leading: String = chars.by_ref().take_while(|c| *c != '.').collect();
    if leading.is_empty() || !leading.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// The upstream ref(s) that would still back a stored raw version.
///
/// This is the inverse of [`derive_version`], used by stale pruning to
/// decide whether a stored row's ref still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// A `dev-` version maps back to exactly one branch name.
    Branch(String),
    /// A numeric version maps back to a tag, with or without the `v`
    /// prefix. Known ambiguity: a *branch* that happens to be named like a
    /// version cannot keep a tag-derived row alive; only tags are
    /// considered here.
    Tags([String; 2]),
}

/// Compute the ref names that would have produced a stored raw version.
pub fn ref_name_candidates(raw: &str) -> RefTarget {
    match raw.strip_prefix("dev-") {
        Some(branch) => RefTarget::Branch(branch.to_string()),
        None => RefTarget::Tags([raw.to_string(), format!("v{raw}")]),
    }
}
