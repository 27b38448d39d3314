use sea_orm::entity::prelude::*;

/// Canonical job copy record. The database row is always authoritative; the
/// on-disk mirror pointed at by `on_disk_path` is a best-effort cache.
///
/// Site-check schedule state (`site_check_*`) lives on the same row so a
/// process restart resumes the verification schedule where it left off.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "job_copies")]
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
    pub last_error: Option<String>,
    pub preview_url: Option<String>,
    pub site_check_attempts: i32,
    pub site_check_phase: String,
    pub site_check_next_at: Option<chrono::DateTime<chrono::Utc>>,
    pub delivered_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
