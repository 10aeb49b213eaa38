use std::sync::Arc;

use console::style;
use packforge::db;
use packforge::entity::run_status::RunStatus;
use packforge::provider::ProviderRegistry;
use packforge::sync::{CancelToken, SyncOptions, SyncOrchestrator, SyncOutcome};
use uuid::Uuid;

use crate::credentials::EnvCredentialStore;
use crate::progress::console_reporter;

/// What to sync. Exactly one selector is required.
#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = false)]
pub(crate) struct SyncTarget {
    /// Sync a single repository by id
    #[arg(short = 'r', long)]
    pub repo: Option<Uuid>,

    /// Sync every repository of one organization
    #[arg(short = 'o', long)]
    pub org: Option<Uuid>,

    /// Sync every connected repository
    #[arg(short = 'A', long)]
    pub all: bool,
}

pub(crate) async fn handle_sync(
    database_url: &str,
    target: SyncTarget,
    concurrency: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    let mut options = SyncOptions::default();
    if let Some(concurrency) = concurrency {
        options.concurrency = concurrency;
    }
    let orchestrator =
        SyncOrchestrator::new(db, ProviderRegistry::with_defaults()).with_options(options);
    let credentials = EnvCredentialStore::from_env();

    let cancel = Arc::new(CancelToken::new());
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling... letting in-flight tasks finish.");
            ctrl_c_cancel.cancel();
        }
    });

    let on_progress = Some(console_reporter());
    let outcomes = if let Some(repo) = target.repo {
        vec![
            orchestrator
                .sync_repository(repo, &credentials, cancel, on_progress)
                .await?,
        ]
    } else if let Some(org) = target.org {
        orchestrator
            .sync_org(org, &credentials, cancel, on_progress)
            .await?
    } else {
        orchestrator
            .sync_all(&credentials, cancel, on_progress)
            .await?
    };

    print_summary(&outcomes);
    if outcomes.iter().any(|o| o.status == RunStatus::Failed) {
        return Err("one or more sync runs failed".into());
    }
    Ok(())
}

fn print_summary(outcomes: &[SyncOutcome]) {
    println!();
    for outcome in outcomes {
        let status = match outcome.status {
            RunStatus::Success => style("ok").green(),
            RunStatus::Failed if outcome.cancelled => style("cancelled").yellow(),
            _ => style("failed").red(),
        };
        let c = outcome.counts;
        println!(
            "{} {}  +{} ~{} -{}  skipped {}  failed {}",
            status,
            outcome.repository_id,
            c.added,
            c.updated,
            c.removed,
            c.skipped,
            c.failed,
        );
        if let Some(message) = &outcome.error_message {
            println!("    {}", style(message).dim());
        }
    }
}
