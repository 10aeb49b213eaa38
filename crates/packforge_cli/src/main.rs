//! Packforge CLI - operational trigger surface for the sync engine.

mod commands;
mod credentials;
mod progress;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packforge")]
#[command(version)]
#[command(about = "Repository synchronization for a private package registry")]
#[command(
    long_about = "Packforge keeps a private package registry's catalog in step with the Git \
repositories it was built from. It lists refs through provider adapters, reads composer.json \
manifests at changed refs, derives normalized versions, and prunes versions whose refs \
disappeared upstream."
)]
#[command(after_long_help = r#"EXAMPLES
    Apply migrations and sync every connected repository:
        $ packforge migrate up
        $ packforge sync --all

    Sync one repository:
        $ packforge sync --repo 7d4df19c-3b9a-4d55-9c40-8c6c8f3f9a11

    Sync one organization's repositories with more tasks in flight:
        $ packforge sync --org 2f0c9c9e-... --concurrency 16

ENVIRONMENT VARIABLES
    PACKFORGE_DATABASE_URL    Database connection string (default: sqlite://packforge.db?mode=rwc)
    PACKFORGE_API_TOKEN       Token for hosted-API providers
    PACKFORGE_API_BASE        API base URL for self-hosted instances
    PACKFORGE_GIT_USERNAME    Username for generic Git HTTP(S) remotes
    PACKFORGE_GIT_PASSWORD    Password for generic Git HTTP(S) remotes
"#)]
struct Cli {
    /// Database connection string (overrides PACKFORGE_DATABASE_URL)
    #[arg(short = 'd', long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Run sync over connected repositories
    Sync {
        #[command(flatten)]
        target: commands::sync::SyncTarget,

        /// Maximum per-ref tasks in flight per repository
        #[arg(short = 'c', long)]
        concurrency: Option<usize>,
    },
    /// List connected repositories and their sync state
    Repos,
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://packforge.db?mode=rwc";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("packforge=info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .or_else(|| std::env::var("PACKFORGE_DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
    tracing::debug!(%database_url, "Using database");

    let result = match cli.command {
        Commands::Migrate { action } => commands::migrate::handle_migrate(action, &database_url).await,
        Commands::Sync {
            target,
            concurrency,
        } => commands::sync::handle_sync(&database_url, target, concurrency).await,
        Commands::Repos => commands::repos::handle_repos(&database_url).await,
    };

    if let Err(e) = result {
        eprintln!("{} {e}", console::style("error:").red().bold());
        std::process::exit(1);
    }
}
