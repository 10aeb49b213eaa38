use console::style;
use packforge::db;
use packforge::entity::sync_status::SyncStatus;
use packforge::store::repos;

pub(crate) async fn handle_repos(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;
    let all = repos::find_all(&db).await?;

    if all.is_empty() {
        println!("No repositories connected.");
        return Ok(());
    }

    for repo in all {
        let status = match repo.sync_status {
            SyncStatus::Ok => style("ok").green(),
            SyncStatus::Failed => style("failed").red(),
            SyncStatus::Pending => style("pending").yellow(),
        };
        let last = repo
            .last_synced_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{}  {:10}  {}  [{}]  last sync: {}",
            repo.id, status, repo.remote_id, repo.provider, last
        );
    }

    Ok(())
}
