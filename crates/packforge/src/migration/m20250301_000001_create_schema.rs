//! Initial migration to create the packforge database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_repositories(manager).await?;
        self.create_packages(manager).await?;
        self.create_package_versions(manager).await?;
        self.create_sync_logs(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PackageVersions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Packages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Repositories::OrgId).uuid().not_null())
                    .col(ColumnDef::new(Repositories::Provider).string().not_null())
                    .col(ColumnDef::new(Repositories::RemoteId).string().not_null())
                    .col(ColumnDef::new(Repositories::DefaultBranch).string().null())
                    .col(
                        ColumnDef::new(Repositories::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Repositories::SyncStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Repositories::WebhookSecret).text().null())
                    .col(
                        ColumnDef::new(Repositories::CredentialOwnerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Repositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_org")
                    .table(Repositories::Table)
                    .col(Repositories::OrgId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_packages(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Packages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Packages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Packages::OrgId).uuid().not_null())
                    .col(ColumnDef::new(Packages::RepositoryId).uuid().not_null())
                    .col(ColumnDef::new(Packages::Name).string().not_null())
                    .col(ColumnDef::new(Packages::Description).text().null())
                    .col(
                        ColumnDef::new(Packages::PackageType)
                            .string()
                            .not_null()
                            .default("library"),
                    )
                    .col(
                        ColumnDef::new(Packages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packages_repository")
                            .from(Packages::Table, Packages::RepositoryId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Packages are unique per (organization, declared name).
        manager
            .create_index(
                Index::create()
                    .name("idx_packages_org_name")
                    .table(Packages::Table)
                    .col(Packages::OrgId)
                    .col(Packages::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_packages_repository")
                    .table(Packages::Table)
                    .col(Packages::RepositoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_package_versions(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PackageVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackageVersions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PackageVersions::PackageId).uuid().not_null())
                    .col(ColumnDef::new(PackageVersions::Version).string().not_null())
                    .col(
                        ColumnDef::new(PackageVersions::NormalizedVersion)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackageVersions::Manifest)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(ColumnDef::new(PackageVersions::SourceUrl).text().not_null())
                    .col(
                        ColumnDef::new(PackageVersions::SourceReference)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PackageVersions::DistUrl).text().null())
                    .col(
                        ColumnDef::new(PackageVersions::ReleasedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_package_versions_package")
                            .from(PackageVersions::Table, PackageVersions::PackageId)
                            .to(Packages::Table, Packages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (package, raw version string); the upsert conflict target.
        manager
            .create_index(
                Index::create()
                    .name("idx_package_versions_package_version")
                    .table(PackageVersions::Table)
                    .col(PackageVersions::PackageId)
                    .col(PackageVersions::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_sync_logs(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SyncLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SyncLogs::RepositoryId).uuid().not_null())
                    .col(ColumnDef::new(SyncLogs::BatchId).uuid().null())
                    .col(
                        ColumnDef::new(SyncLogs::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SyncLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(SyncLogs::Added)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::Updated)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::Skipped)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::Failed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::Removed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncLogs::Details)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_logs_repository")
                            .from(SyncLogs::Table, SyncLogs::RepositoryId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_logs_repository_started")
                    .table(SyncLogs::Table)
                    .col(SyncLogs::RepositoryId)
                    .col(SyncLogs::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "repositories")]
enum Repositories {
    Table,
    Id,
    OrgId,
    Provider,
    RemoteId,
    DefaultBranch,
    LastSyncedAt,
    SyncStatus,
    WebhookSecret,
    CredentialOwnerId,
    CreatedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "packages")]
enum Packages {
    Table,
    Id,
    OrgId,
    RepositoryId,
    Name,
    Description,
    PackageType,
    CreatedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "package_versions")]
enum PackageVersions {
    Table,
    Id,
    PackageId,
    Version,
    NormalizedVersion,
    Manifest,
    SourceUrl,
    SourceReference,
    DistUrl,
    ReleasedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "sync_logs")]
enum SyncLogs {
    Table,
    Id,
    RepositoryId,
    BatchId,
    Status,
    StartedAt,
    CompletedAt,
    ErrorMessage,
    Added,
    Updated,
    Skipped,
    Failed,
    Removed,
    Details,
}
