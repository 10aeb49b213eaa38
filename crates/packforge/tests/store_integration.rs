//! Integration tests for the persistence layer.
//!
//! Runs against in-memory SQLite with migrations applied, exercising the
//! natural-key upserts and the sync log lifecycle the way concurrent sync
//! tasks use them.

use chrono::Utc;
use packforge::connect_and_migrate;
use packforge::entity::package_version::ActiveModel as PackageVersionActiveModel;
use packforge::entity::provider_kind::ProviderKind;
use packforge::entity::repository::ActiveModel as RepositoryActiveModel;
use packforge::entity::run_status::RunStatus;
use packforge::entity::sync_status::SyncStatus;
use packforge::store::{packages, repos, sync_logs, versions, LogCounts};
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

async fn setup_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("in-memory migration should succeed")
}

async fn insert_repo(db: &DatabaseConnection, org_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    let model = RepositoryActiveModel {
        id: Set(id),
        org_id: Set(org_id),
        provider: Set(ProviderKind::GenericGit),
        remote_id: Set(format!("https://git.example.com/acme/{id}.git")),
        default_branch: Set(Some("main".to_string())),
        last_synced_at: Set(None),
        sync_status: Set(SyncStatus::Pending),
        webhook_secret: Set(None),
        credential_owner_id: Set(Uuid::new_v4()),
        created_at: Set(Utc::now().fixed_offset()),
    };
    repos::insert(db, model).await.expect("repo should insert");
    id
}

fn version_model(package_id: Uuid, version: &str, sha: &str) -> PackageVersionActiveModel {
    PackageVersionActiveModel {
        package_id: Set(package_id),
        version: Set(version.to_string()),
        normalized_version: Set(format!("{version}.0")),
        manifest: Set(serde_json::json!({"name": "acme/widgets"})),
        source_url: Set("https://git.example.com/acme/widgets.git".to_string()),
        source_reference: Set(sha.to_string()),
        dist_url: Set(None),
        released_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
}

#[tokio::test]
async fn find_or_create_package_is_idempotent() {
    let db = setup_db().await;
    let org_id = Uuid::new_v4();
    let repo_id = insert_repo(&db, org_id).await;

    let first = packages::find_or_create(&db, org_id, repo_id, "acme/widgets", None, "library")
        .await
        .expect("first create should succeed");
    let second = packages::find_or_create(
        &db,
        org_id,
        repo_id,
        "acme/widgets",
        Some("late description".to_string()),
        "library",
    )
    .await
    .expect("second call should find the existing row");

    assert_eq!(first.id, second.id);
    // The first writer's row survives untouched.
    assert_eq!(second.description, None);
}

#[tokio::test]
async fn same_name_in_different_orgs_creates_distinct_packages() {
    let db = setup_db().await;
    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();
    let repo_a = insert_repo(&db, org_a).await;
    let repo_b = insert_repo(&db, org_b).await;

    let a = packages::find_or_create(&db, org_a, repo_a, "acme/widgets", None, "library")
        .await
        .expect("org A create");
    let b = packages::find_or_create(&db, org_b, repo_b, "acme/widgets", None, "library")
        .await
        .expect("org B create");

    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn version_upsert_overwrites_ref_fields_and_keeps_identity() {
    let db = setup_db().await;
    let org_id = Uuid::new_v4();
    let repo_id = insert_repo(&db, org_id).await;
    let package = packages::find_or_create(&db, org_id, repo_id, "acme/widgets", None, "library")
        .await
        .expect("package");

    let inserted = versions::upsert(&db, version_model(package.id, "1.0.0", "aaa"))
        .await
        .expect("insert");
    assert_eq!(inserted.source_reference, "aaa");

    let updated = versions::upsert(&db, version_model(package.id, "1.0.0", "bbb"))
        .await
        .expect("update");
    assert_eq!(updated.id, inserted.id);
    assert_eq!(updated.source_reference, "bbb");

    let all = versions::find_by_package(&db, package.id)
        .await
        .expect("list");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn versions_for_repository_joins_across_packages() {
    let db = setup_db().await;
    let org_id = Uuid::new_v4();
    let repo_id = insert_repo(&db, org_id).await;
    let other_repo_id = insert_repo(&db, org_id).await;

    let pkg = packages::find_or_create(&db, org_id, repo_id, "acme/widgets", None, "library")
        .await
        .expect("package");
    let other = packages::find_or_create(&db, org_id, other_repo_id, "acme/gears", None, "library")
        .await
        .expect("other package");

    versions::upsert(&db, version_model(pkg.id, "1.0.0", "aaa"))
        .await
        .expect("v1");
    versions::upsert(&db, version_model(pkg.id, "1.1.0", "bbb"))
        .await
        .expect("v2");
    versions::upsert(&db, version_model(other.id, "2.0.0", "ccc"))
        .await
        .expect("other repo version");

    let rows = versions::find_by_repository(&db, repo_id)
        .await
        .expect("join");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.package_id == pkg.id));
}

#[tokio::test]
async fn sync_log_lifecycle() {
    let db = setup_db().await;
    let repo_id = insert_repo(&db, Uuid::new_v4()).await;
    let batch_id = Uuid::new_v4();

    let log = sync_logs::create_pending(&db, repo_id, Some(batch_id))
        .await
        .expect("pending log");
    assert_eq!(log.status, RunStatus::Pending);
    assert!(log.completed_at.is_none());

    let finalized = sync_logs::finalize(
        &db,
        log.id,
        RunStatus::Success,
        LogCounts {
            added: 3,
            updated: 1,
            skipped: 2,
            failed: 0,
            removed: 1,
        },
        None,
        serde_json::json!(["v9: no composer.json"]),
    )
    .await
    .expect("finalize");

    assert_eq!(finalized.status, RunStatus::Success);
    assert!(finalized.completed_at.is_some());
    assert_eq!(finalized.added, 3);
    assert_eq!(finalized.removed, 1);
    assert_eq!(finalized.started_at, log.started_at);

    let history = sync_logs::find_by_repository(&db, repo_id, None)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);

    let batch = sync_logs::find_by_batch(&db, batch_id).await.expect("batch");
    assert_eq!(batch.len(), 1);
}

#[tokio::test]
async fn set_sync_state_stamps_the_repository() {
    let db = setup_db().await;
    let repo_id = insert_repo(&db, Uuid::new_v4()).await;

    let before = repos::get_by_id(&db, repo_id).await.expect("fetch");
    assert_eq!(before.sync_status, SyncStatus::Pending);
    assert!(before.last_synced_at.is_none());

    repos::set_sync_state(&db, repo_id, SyncStatus::Ok)
        .await
        .expect("state update");

    let after = repos::get_by_id(&db, repo_id).await.expect("fetch again");
    assert_eq!(after.sync_status, SyncStatus::Ok);
    assert!(after.last_synced_at.is_some());
}

#[tokio::test]
async fn deleting_a_repository_cascades() {
    let db = setup_db().await;
    let org_id = Uuid::new_v4();
    let repo_id = insert_repo(&db, org_id).await;
    let package = packages::find_or_create(&db, org_id, repo_id, "acme/widgets", None, "library")
        .await
        .expect("package");
    versions::upsert(&db, version_model(package.id, "1.0.0", "aaa"))
        .await
        .expect("version");
    sync_logs::create_pending(&db, repo_id, None)
        .await
        .expect("log");

    let deleted = repos::delete(&db, repo_id).await.expect("delete");
    assert_eq!(deleted, 1);

    assert!(packages::find_by_id(&db, package.id)
        .await
        .expect("package lookup")
        .is_none());
    assert!(versions::find_by_package(&db, package.id)
        .await
        .expect("version lookup")
        .is_empty());
    assert!(sync_logs::find_by_repository(&db, repo_id, None)
        .await
        .expect("log lookup")
        .is_empty());
}
