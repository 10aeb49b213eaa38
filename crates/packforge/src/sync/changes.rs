//! Ref change detection.
//!
//! Compares the upstream ref listings against the stored version state and
//! keeps only the refs whose derived version is new or whose commit moved.
//! Tags and branches are diffed independently; a branch named like a tag
//! can never mask it because branches derive `dev-` versions.

use std::collections::HashMap;

use crate::composer::version::{derive_version, DerivedVersion, RefKind};
use crate::provider::GitRef;

/// A ref that needs a per-ref sync task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefChange {
    pub kind: RefKind,
    pub git_ref: GitRef,
    /// Version derived from the ref name, computed once here.
    pub derived: DerivedVersion,
}

/// Stored state used for diffing: raw version string to the commit SHA it
/// was last synced at.
pub type StoredShas = HashMap<String, String>;

/// Select the refs whose version is absent or whose commit moved.
///
/// On a first sync the stored map is empty and every ref comes back. A ref
/// whose stored SHA matches upstream is unchanged and produces no task.
pub fn detect_changes(
    tags: &[GitRef],
    branches: &[GitRef],
    stored: &StoredShas,
) -> Vec<RefChange> {
    let mut changes = Vec::new();

    for (kind, refs) in [(RefKind::Tag, tags), (RefKind::Branch, branches)] {
        for git_ref in refs {
            let derived = derive_version(kind, &git_ref.name);
            let unchanged = stored
                .get(&derived.raw)
                .is_some_and(|sha| *sha == git_ref.sha);
            if unchanged {
                continue;
            }
            changes.push(RefChange {
                kind,
                git_ref: git_ref.clone(),
                derived,
            });
        }
    }

    changes
}
