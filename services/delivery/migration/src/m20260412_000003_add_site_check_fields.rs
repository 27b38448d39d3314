use sea_orm_migration::prelude::*;

use crate::m20260410_000001_create_job_copies::JobCopies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(JobCopies::Table)
                    .add_column(ColumnDef::new(SiteCheck::PreviewUrl).string())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(JobCopies::Table)
                    .add_column(
                        ColumnDef::new(SiteCheck::SiteCheckAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(JobCopies::Table)
                    .add_column(
                        ColumnDef::new(SiteCheck::SiteCheckPhase)
                            .string()
                            .not_null()
                            .default("initial"),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(JobCopies::Table)
                    .add_column(ColumnDef::new(SiteCheck::SiteCheckNextAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index for the worker's due-probe poll (pending checks by next_at).
        manager
            .create_index(
                Index::create()
                    .table(JobCopies::Table)
                    .col(SiteCheck::SiteCheckNextAt)
                    .name("idx_job_copies_site_check_next_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .table(JobCopies::Table)
                    .name("idx_job_copies_site_check_next_at")
                    .to_owned(),
            )
            .await?;
        for col in [
            SiteCheck::SiteCheckNextAt,
            SiteCheck::SiteCheckPhase,
            SiteCheck::SiteCheckAttempts,
            SiteCheck::PreviewUrl,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(JobCopies::Table)
                        .drop_column(col)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden, Clone, Copy)]
enum SiteCheck {
    PreviewUrl,
    SiteCheckAttempts,
    SiteCheckPhase,
    SiteCheckNextAt,
}
