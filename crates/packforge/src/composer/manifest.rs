//! Package manifest decoding and validation.

use serde_json::Value;
use thiserror::Error;

/// The manifest filename read at every changed ref.
pub const MANIFEST_FILENAME: &str = "composer.json";

/// Errors produced while decoding a package manifest.
///
/// These are always task-local: a malformed manifest at one ref is recorded
/// as a skip and must never abort sibling tasks.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The payload is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded, but not to a JSON object.
    #[error("Manifest root must be a JSON object")]
    NotAnObject,

    /// The required `name` field is missing or not a string.
    #[error("Manifest is missing a name")]
    MissingName,

    /// The `name` field is not of the form `vendor/package`.
    #[error("Invalid package name: {name:?}")]
    InvalidName { name: String },
}

/// A decoded, validated package manifest.
///
/// `name`, `package_type`, and `description` are extracted for downstream
/// convenience; `document` keeps the full parsed payload for metadata
/// synthesis (require, autoload, authors, keywords, license, ...).
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    /// Declared `vendor/package` name.
    pub name: String,
    /// Manifest `type`, defaulting to `"library"`.
    pub package_type: String,
    /// Manifest `description`, when present.
    pub description: Option<String>,
    /// The full parsed document.
    pub document: Value,
}

/// Decode and validate a raw manifest payload.
///
/// Validation: the payload must decode to a JSON object carrying a string
/// `name` with exactly one `/` separating a non-empty vendor and package
/// part.
pub fn parse_manifest(raw: &str) -> Result<ManifestDocument, ManifestError> {
    let document: Value = serde_json::from_str(raw)?;

    let object = document.as_object().ok_or(ManifestError::NotAnObject)?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ManifestError::MissingName)?
        .to_string();

    let valid = match name.split_once('/') {
        Some((vendor, package)) => {
            !vendor.is_empty() && !package.is_empty() && !package.contains('/')
        }
        None => false,
    };
    if !valid {
        return Err(ManifestError::InvalidName { name });
    }

    let package_type = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("library")
        .to_string();

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);

    Ok(ManifestDocument {
        name,
        package_type,
        description,
        document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let doc = parse_manifest(r#"{"name": "acme/widgets"}"#).expect("should parse");
        assert_eq!(doc.name, "acme/widgets");
        assert_eq!(doc.package_type, "library");
        assert!(doc.description.is_none());
    }

    #[test]
    fn extracts_type_and_description() {
        let doc = parse_manifest(
            r#"{"name": "acme/widgets", "type": "project", "description": "Widgets."}"#,
        )
        .expect("should parse");
        assert_eq!(doc.package_type, "project");
        assert_eq!(doc.description.as_deref(), Some("Widgets."));
    }

    #[test]
    fn keeps_full_document() {
        let doc = parse_manifest(
            r#"{"name": "acme/widgets", "require": {"php": ">=8.1"}, "license": "MIT"}"#,
        )
        .expect("should parse");
        assert_eq!(doc.document["require"]["php"], ">=8.1");
        assert_eq!(doc.document["license"], "MIT");
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_manifest("{not json"),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(
            parse_manifest(r#"["acme/widgets"]"#),
            Err(ManifestError::NotAnObject)
        ));
    }

    #[test]
    fn rejects_missing_name() {
        assert!(matches!(
            parse_manifest(r#"{"type": "library"}"#),
            Err(ManifestError::MissingName)
        ));
        // A non-string name is treated as missing, not invalid.
        assert!(matches!(
            parse_manifest(r#"{"name": 42}"#),
            Err(ManifestError::MissingName)
        ));
    }

    #[test]
    fn rejects_names_without_exactly_one_separator() {
        for name in ["widgets", "acme/", "/widgets", "acme/widgets/extra"] {
            let raw = format!(r#"{{"name": {}}}"#, serde_json::json!(name));
            assert!(
                matches!(parse_manifest(&raw), Err(ManifestError::InvalidName { .. })),
                "name {:?} should be rejected",
                name
            );
        }
    }
}
