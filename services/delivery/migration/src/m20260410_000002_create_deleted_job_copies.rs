use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeletedJobCopies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeletedJobCopies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeletedJobCopies::JobId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(DeletedJobCopies::ClientName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletedJobCopies::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeletedJobCopies::Status).string().not_null())
                    .col(
                        ColumnDef::new(DeletedJobCopies::DeliveryMode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeletedJobCopies::DeliveryUrl).string())
                    .col(ColumnDef::new(DeletedJobCopies::OnDiskPath).string())
                    .col(
                        ColumnDef::new(DeletedJobCopies::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DeletedJobCopies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletedJobCopies::DeletedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletedJobCopies::DestroyAfter)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the retention purge scan (everything past destroy_after).
        manager
            .create_index(
                Index::create()
                    .table(DeletedJobCopies::Table)
                    .col(DeletedJobCopies::DestroyAfter)
                    .name("idx_deleted_job_copies_destroy_after")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeletedJobCopies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DeletedJobCopies {
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
    CreatedAt,
    DeletedAt,
    DestroyAfter,
}
