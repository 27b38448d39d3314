use chrono::Utc;

use crate::domain::repository::JobCopyRepository;
use crate::error::DeliveryServiceError;

/// Move a job copy to quarantine. This is the sole cancellation signal for
/// the job's site-check schedule: once quarantined the row stops matching
/// due-probe queries.
pub struct SoftDeleteJobCopyUseCase<R>
where
    R: JobCopyRepository,
{
    pub repo: R,
}

impl<R> SoftDeleteJobCopyUseCase<R>
where
    R: JobCopyRepository,
{
    pub async fn execute(&self, job_id: &str) -> Result<(), DeliveryServiceError> {
        self.repo.soft_delete(job_id, Utc::now()).await?;
        tracing::info!(job_id, "job copy quarantined");
        Ok(())
    }
}
