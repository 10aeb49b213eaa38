//! Stale version pruning.
//!
//! After the per-ref tasks settle, stored versions whose backing ref no
//! longer exists upstream are removed. The decision runs against the full,
//! unfiltered ref listings; the change-detection filter never feeds this
//! phase, otherwise an unchanged ref would look deleted.

use std::collections::HashSet;

use crate::composer::version::{ref_name_candidates, RefTarget};
use crate::entity::package_version;
use crate::provider::GitRef;

/// Select the stored versions whose backing ref disappeared upstream.
///
/// A `dev-` version survives while its branch exists. A numeric version
/// survives while a tag named either `<raw>` or `v<raw>` exists. Known
/// ambiguity: a branch named like a numeric version cannot keep a
/// tag-derived row alive; only tags are consulted for numeric versions.
pub fn stale_versions<'a>(
    stored: &'a [package_version::Model],
    tags: &[GitRef],
    branches: &[GitRef],
) -> Vec<&'a package_version::Model> {
    let tag_names: HashSet<&str> = tags.iter().map(|r| r.name.as_str()).collect();
    let branch_names: HashSet<&str> = branches.iter().map(|r| r.name.as_str()).collect();

    stored
        .iter()
        .filter(|row| match ref_name_candidates(&row.version) {
            RefTarget::Branch(branch) => !branch_names.contains(branch.as_str()),
            RefTarget::Tags(candidates) => !candidates
                .iter()
                .any(|name| tag_names.contains(name.as_str())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn version_row(version: &str) -> package_version::Model {
        package_version::Model {
            id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            version: version.to_string(),
            normalized_version: version.to_string(),
            manifest: serde_json::json!({}),
            source_url: "https://git.example.com/acme/widgets.git".to_string(),
            source_reference: "aaa".to_string(),
            dist_url: None,
            released_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn dev_version_survives_while_its_branch_exists() {
        let stored = vec![version_row("dev-main"), version_row("dev-old-feature")];
        let branches = vec![GitRef::new("main", "aaa")];

        let stale = stale_versions(&stored, &[], &branches);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].version, "dev-old-feature");
    }

    #[test]
    fn numeric_version_survives_under_either_tag_spelling() {
        let stored = vec![version_row("1.0.0"), version_row("1.1.0")];
        // 1.0.0 backed by a v-prefixed tag, 1.1.0 backed by a bare one.
        let tags = vec![GitRef::new("v1.0.0", "aaa"), GitRef::new("1.1.0", "bbb")];

        assert!(stale_versions(&stored, &tags, &[]).is_empty());
    }

    #[test]
    fn numeric_version_with_no_tag_left_is_stale() {
        let stored = vec![version_row("1.0.0")];
        let tags = vec![GitRef::new("v2.0.0", "aaa")];

        let stale = stale_versions(&stored, &tags, &[]);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].version, "1.0.0");
    }

    #[test]
    fn version_shaped_branch_does_not_keep_a_numeric_version_alive() {
        let stored = vec![version_row("1.0.0")];
        let branches = vec![GitRef::new("1.0.0", "aaa")];

        // Only tags are consulted for numeric versions.
        assert_eq!(stale_versions(&stored, &[], &branches).len(), 1);
    }

    #[test]
    fn empty_upstream_marks_everything_stale() {
        let stored = vec![version_row("dev-main"), version_row("1.0.0")];
        assert_eq!(stale_versions(&stored, &[], &[]).len(), 2);
    }
}
