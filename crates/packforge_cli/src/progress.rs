//! Console progress reporting for sync runs.

use console::style;
use packforge::sync::{ProgressCallback, SyncProgress};

/// A progress callback that narrates the run on stdout.
pub(crate) fn console_reporter() -> ProgressCallback {
    Box::new(|event| match event {
        SyncProgress::RunStarted { repository_id, .. } => {
            println!("{} {repository_id}", style("Syncing").cyan().bold());
        }
        SyncProgress::RefsListed { tags, branches } => {
            println!("  found {tags} tags, {branches} branches");
        }
        SyncProgress::ChangesDetected {
            to_sync,
            total_refs,
        } => {
            println!("  {to_sync} of {total_refs} refs changed");
        }
        SyncProgress::RefSynced {
            ref_name,
            version,
            added,
        } => {
            let verb = if added { "added" } else { "updated" };
            println!("  {} {version} ({ref_name})", style(verb).green());
        }
        SyncProgress::RefSkipped { ref_name, reason } => {
            println!("  {} {ref_name}: {reason}", style("skipped").yellow());
        }
        SyncProgress::RefFailed { ref_name, error } => {
            println!("  {} {ref_name}: {error}", style("failed").red());
        }
        SyncProgress::VersionPruned { version, .. } => {
            println!("  {} {version}", style("pruned").magenta());
        }
        SyncProgress::RunFinalized { counts, .. } => {
            println!(
                "  done: +{} ~{} -{} (skipped {}, failed {})",
                counts.added, counts.updated, counts.removed, counts.skipped, counts.failed
            );
        }
        SyncProgress::Warning { message } => {
            println!("  {} {message}", style("warning").yellow().bold());
        }
        _ => {}
    })
}
