use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobCopies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobCopies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JobCopies::JobId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(JobCopies::ClientName).string().not_null())
                    .col(ColumnDef::new(JobCopies::Payload).json_binary().not_null())
                    .col(ColumnDef::new(JobCopies::Status).string().not_null())
                    .col(
                        ColumnDef::new(JobCopies::DeliveryMode)
                            .string()
                            .not_null()
                            .default("manual"),
                    )
                    .col(ColumnDef::new(JobCopies::DeliveryUrl).string())
                    .col(ColumnDef::new(JobCopies::OnDiskPath).string())
                    .col(
                        ColumnDef::new(JobCopies::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(JobCopies::LastError).text())
                    .col(ColumnDef::new(JobCopies::DeliveredAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(JobCopies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobCopies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for admin list queries (newest first).
        manager
            .create_index(
                Index::create()
                    .table(JobCopies::Table)
                    .col(JobCopies::CreatedAt)
                    .name("idx_job_copies_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobCopies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum JobCopies {
    Table,
    Id,
    JobId,
    ClientName,
    Payload,
    Status,
    DeliveryMode,
    DeliveryUrl,
    OnDiskPath,
    Archived,
    LastError,
    DeliveredAt,
    CreatedAt,
    UpdatedAt,
}
