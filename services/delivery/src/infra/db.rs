use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use procontent_delivery_schema::{deleted_job_copies, job_copies};

use crate::domain::repository::{JobCopyFilter, JobCopyRepository, PurgedCopy, StatusUpdate};
use crate::domain::types::{
    DeletedJobCopy, DeliveryMode, JobCopy, JobStatus, NewJobCopy, RETENTION_HOURS,
    SiteCheckPhase, SiteCheckSchedule,
};
use crate::error::DeliveryServiceError;

#[derive(Clone)]
pub struct DbJobCopyRepository {
    pub db: DatabaseConnection,
}

impl JobCopyRepository for DbJobCopyRepository {
    async fn upsert(&self, copy: &NewJobCopy) -> Result<JobCopy, DeliveryServiceError> {
        let now = Utc::now();
        let model = job_copies::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_id: Set(copy.job_id.clone()),
            client_name: Set(copy.client_name.clone()),
            payload: Set(copy.payload.clone()),
            status: Set(JobStatus::Pending.as_str().to_owned()),
            delivery_mode: Set(copy.delivery_mode.as_str().to_owned()),
            delivery_url: Set(None),
            on_disk_path: Set(None),
            archived: Set(false),
            last_error: Set(None),
            preview_url: Set(None),
            site_check_attempts: Set(0),
            site_check_phase: Set(SiteCheckPhase::Initial.as_str().to_owned()),
            site_check_next_at: Set(None),
            delivered_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        // Re-ingest of the same job_id overwrites the payload and restarts
        // the lifecycle at `pending`.
        let inserted = job_copies::Entity::insert(model)
            .on_conflict(
                OnConflict::column(job_copies::Column::JobId)
                    .update_columns([
                        job_copies::Column::ClientName,
                        job_copies::Column::Payload,
                        job_copies::Column::Status,
                        job_copies::Column::Archived,
                        job_copies::Column::LastError,
                        job_copies::Column::PreviewUrl,
                        job_copies::Column::SiteCheckAttempts,
                        job_copies::Column::SiteCheckPhase,
                        job_copies::Column::SiteCheckNextAt,
                        job_copies::Column::DeliveredAt,
                        job_copies::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .context("upsert job copy")?;
        job_copy_from_model(inserted)
    }

    async fn find(&self, job_id: &str) -> Result<Option<JobCopy>, DeliveryServiceError> {
        let model = job_copies::Entity::find()
            .filter(job_copies::Column::JobId.eq(job_id))
            .one(&self.db)
            .await
            .context("find job copy")?;
        model.map(job_copy_from_model).transpose()
    }

    async fn is_quarantined(&self, job_id: &str) -> Result<bool, DeliveryServiceError> {
        let count = deleted_job_copies::Entity::find()
            .filter(deleted_job_copies::Column::JobId.eq(job_id))
            .count(&self.db)
            .await
            .context("check quarantine")?;
        Ok(count > 0)
    }

    async fn list(
        &self,
        filter: &JobCopyFilter,
    ) -> Result<(Vec<JobCopy>, u64), DeliveryServiceError> {
        let mut query = job_copies::Entity::find();
        if let Some(needle) = filter
            .client_substring
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            query = query.filter(job_copies::Column::ClientName.contains(needle));
        }
        if let Some(status) = filter.status {
            query = query.filter(job_copies::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await.context("count job copies")?;

        let page = filter.page.max(1);
        let models = query
            .order_by_desc(job_copies::Column::CreatedAt)
            .offset(page.saturating_sub(1).saturating_mul(filter.page_size))
            .limit(filter.page_size)
            .all(&self.db)
            .await
            .context("list job copies")?;
        let copies = models
            .into_iter()
            .map(job_copy_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((copies, total))
    }

    async fn list_deleted(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<DeletedJobCopy>, u64), DeliveryServiceError> {
        let total = deleted_job_copies::Entity::find()
            .count(&self.db)
            .await
            .context("count deleted job copies")?;
        let models = deleted_job_copies::Entity::find()
            .order_by_desc(deleted_job_copies::Column::DeletedAt)
            .offset(page.max(1).saturating_sub(1).saturating_mul(page_size))
            .limit(page_size)
            .all(&self.db)
            .await
            .context("list deleted job copies")?;
        Ok((
            models.into_iter().map(deleted_from_model).collect(),
            total,
        ))
    }

    async fn set_on_disk_path(
        &self,
        job_id: &str,
        path: &str,
    ) -> Result<(), DeliveryServiceError> {
        job_copies::Entity::update_many()
            .filter(job_copies::Column::JobId.eq(job_id))
            .col_expr(job_copies::Column::OnDiskPath, Expr::value(path))
            .col_expr(job_copies::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .context("set on-disk path")?;
        Ok(())
    }

    async fn set_delivery_url(
        &self,
        job_id: &str,
        url: &str,
    ) -> Result<JobCopy, DeliveryServiceError> {
        let result = job_copies::Entity::update_many()
            .filter(job_copies::Column::JobId.eq(job_id))
            .col_expr(job_copies::Column::DeliveryUrl, Expr::value(url))
            .col_expr(job_copies::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .context("set delivery url")?;
        if result.rows_affected == 0 {
            if self.is_quarantined(job_id).await? {
                return Err(DeliveryServiceError::Conflict);
            }
            return Err(DeliveryServiceError::NotFound);
        }
        self.find(job_id)
            .await?
            .ok_or(DeliveryServiceError::NotFound)
    }

    async fn transition(
        &self,
        job_id: &str,
        expected: &[JobStatus],
        status: JobStatus,
        update: StatusUpdate,
    ) -> Result<bool, DeliveryServiceError> {
        let expected: Vec<&str> = expected.iter().map(JobStatus::as_str).collect();
        let mut stmt = job_copies::Entity::update_many()
            .filter(job_copies::Column::JobId.eq(job_id))
            .filter(job_copies::Column::Status.is_in(expected))
            .col_expr(job_copies::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                job_copies::Column::LastError,
                Expr::value(update.last_error),
            )
            .col_expr(job_copies::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(mode) = update.delivery_mode {
            stmt = stmt.col_expr(
                job_copies::Column::DeliveryMode,
                Expr::value(mode.as_str()),
            );
        }
        if let Some(url) = update.delivery_url {
            stmt = stmt.col_expr(job_copies::Column::DeliveryUrl, Expr::value(url));
        }
        if let Some(url) = update.preview_url {
            stmt = stmt.col_expr(job_copies::Column::PreviewUrl, Expr::value(url));
        }
        if let Some(at) = update.delivered_at {
            stmt = stmt.col_expr(job_copies::Column::DeliveredAt, Expr::value(at));
        }
        if let Some(archived) = update.archived {
            stmt = stmt.col_expr(job_copies::Column::Archived, Expr::value(archived));
        }
        if let Some(schedule) = update.site_check {
            stmt = stmt
                .col_expr(
                    job_copies::Column::SiteCheckAttempts,
                    Expr::value(schedule.attempts_made),
                )
                .col_expr(
                    job_copies::Column::SiteCheckPhase,
                    Expr::value(schedule.phase.as_str()),
                )
                .col_expr(
                    job_copies::Column::SiteCheckNextAt,
                    Expr::value(schedule.next_check_at),
                );
        }
        let result = stmt.exec(&self.db).await.context("transition job copy")?;
        Ok(result.rows_affected > 0)
    }

    async fn due_site_checks(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<JobCopy>, DeliveryServiceError> {
        let models = job_copies::Entity::find()
            .filter(job_copies::Column::Status.is_in([
                JobStatus::SiteCheckPending.as_str(),
                JobStatus::SiteCheckFailed.as_str(),
            ]))
            .filter(job_copies::Column::SiteCheckNextAt.lte(now))
            .order_by_asc(job_copies::Column::SiteCheckNextAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("poll due site checks")?;
        models.into_iter().map(job_copy_from_model).collect()
    }

    async fn soft_delete(
        &self,
        job_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DeliveryServiceError> {
        let job_id = job_id.to_owned();
        let already_quarantined = self.is_quarantined(&job_id).await?;
        let moved = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let Some(row) = job_copies::Entity::find()
                        .filter(job_copies::Column::JobId.eq(&job_id))
                        .one(txn)
                        .await?
                    else {
                        return Ok(false);
                    };
                    let destroy_after = now + Duration::hours(RETENTION_HOURS);
                    let quarantined = deleted_job_copies::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        job_id: Set(row.job_id.clone()),
                        client_name: Set(row.client_name.clone()),
                        payload: Set(row.payload.clone()),
                        status: Set(row.status.clone()),
                        delivery_mode: Set(row.delivery_mode.clone()),
                        delivery_url: Set(row.delivery_url.clone()),
                        on_disk_path: Set(row.on_disk_path.clone()),
                        archived: Set(row.archived),
                        created_at: Set(row.created_at),
                        deleted_at: Set(now),
                        destroy_after: Set(destroy_after),
                    };
                    deleted_job_copies::Entity::insert(quarantined)
                        .on_conflict(
                            OnConflict::column(deleted_job_copies::Column::JobId)
                                .update_columns([
                                    deleted_job_copies::Column::ClientName,
                                    deleted_job_copies::Column::Payload,
                                    deleted_job_copies::Column::Status,
                                    deleted_job_copies::Column::DeletedAt,
                                    deleted_job_copies::Column::DestroyAfter,
                                ])
                                .to_owned(),
                        )
                        .exec(txn)
                        .await?;
                    job_copies::Entity::delete_many()
                        .filter(job_copies::Column::JobId.eq(&row.job_id))
                        .exec(txn)
                        .await?;
                    Ok(true)
                })
            })
            .await
            .context("soft delete job copy")?;
        if !moved && !already_quarantined {
            return Err(DeliveryServiceError::NotFound);
        }
        Ok(())
    }

    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PurgedCopy>, DeliveryServiceError> {
        let due = deleted_job_copies::Entity::find()
            .filter(deleted_job_copies::Column::DestroyAfter.lte(now))
            .all(&self.db)
            .await
            .context("collect expired job copies")?;
        if due.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = due.iter().map(|m| m.id).collect();
        // Deleting by collected ids keeps overlapping purge runs benign: the
        // loser's delete simply matches zero rows.
        deleted_job_copies::Entity::delete_many()
            .filter(deleted_job_copies::Column::Id.is_in(ids))
            .exec(&self.db)
            .await
            .context("purge expired job copies")?;
        Ok(due
            .into_iter()
            .map(|m| PurgedCopy {
                job_id: m.job_id,
                on_disk_path: m.on_disk_path,
            })
            .collect())
    }
}

fn job_copy_from_model(model: job_copies::Model) -> Result<JobCopy, DeliveryServiceError> {
    let status = JobStatus::parse(&model.status)
        .ok_or_else(|| anyhow!("unknown job status {:?}", model.status))?;
    let delivery_mode = DeliveryMode::parse(&model.delivery_mode)
        .ok_or_else(|| anyhow!("unknown delivery mode {:?}", model.delivery_mode))?;
    let phase = SiteCheckPhase::parse(&model.site_check_phase)
        .ok_or_else(|| anyhow!("unknown site check phase {:?}", model.site_check_phase))?;
    Ok(JobCopy {
        id: model.id,
        job_id: model.job_id,
        client_name: model.client_name,
        payload: model.payload,
        status,
        delivery_mode,
        delivery_url: model.delivery_url,
        on_disk_path: model.on_disk_path,
        archived: model.archived,
        last_error: model.last_error,
        preview_url: model.preview_url,
        site_check: SiteCheckSchedule {
            attempts_made: model.site_check_attempts,
            phase,
            next_check_at: model.site_check_next_at,
        },
        delivered_at: model.delivered_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn deleted_from_model(model: deleted_job_copies::Model) -> DeletedJobCopy {
    DeletedJobCopy {
        id: model.id,
        job_id: model.job_id,
        client_name: model.client_name,
        payload: model.payload,
        status: model.status,
        delivery_mode: model.delivery_mode,
        delivery_url: model.delivery_url,
        on_disk_path: model.on_disk_path,
        archived: model.archived,
        created_at: model.created_at,
        deleted_at: model.deleted_at,
        destroy_after: model.destroy_after,
    }
}
