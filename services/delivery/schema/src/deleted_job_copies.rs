use sea_orm::entity::prelude::*;

/// Quarantined job copy. Soft-deleting moves the row here verbatim;
/// `destroy_after` marks the end of the 48h recovery window, after which the
/// retention purge destroys the row for good.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deleted_job_copies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub job_id: String,
    pub client_name: String,
    pub payload: Json,
    pub status: String,
    pub delivery_mode: String,
    pub delivery_url: Option<String>,
    pub on_disk_path: Option<String>,
    pub archived: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub deleted_at: chrono::DateTime<chrono::Utc>,
    pub destroy_after: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
