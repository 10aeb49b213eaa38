//! Composer manifest handling: parsing, validation, and version derivation.
//!
//! The sync engine reads one `composer.json` per changed ref. This module
//! owns the two pure steps between "bytes fetched from the provider" and
//! "row to upsert": decoding/validating the manifest, and deriving the raw
//! and normalized version identifiers from the ref name.

pub mod manifest;
pub mod version;

pub use manifest::{parse_manifest, ManifestDocument, ManifestError};
pub use version::{derive_version, is_stable, ref_name_candidates, DerivedVersion, RefKind};
