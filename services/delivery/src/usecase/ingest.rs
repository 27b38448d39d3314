use crate::domain::repository::{JobCopyRepository, PayloadMirror};
use crate::domain::types::{DeliveryMode, JobCopy, NewJobCopy};
use crate::error::DeliveryServiceError;

pub struct IngestJobCopyInput {
    pub job_id: String,
    pub client_name: String,
    pub payload: serde_json::Value,
}

/// Durably store an ingested job payload: canonical database record first,
/// then the best-effort on-disk mirror. The canonical write is the success
/// criterion; a mirror failure is logged and swallowed.
pub struct IngestJobCopyUseCase<R, M>
where
    R: JobCopyRepository,
    M: PayloadMirror,
{
    pub repo: R,
    pub mirror: M,
    pub default_mode: DeliveryMode,
}

impl<R, M> IngestJobCopyUseCase<R, M>
where
    R: JobCopyRepository,
    M: PayloadMirror,
{
    pub async fn execute(
        &self,
        input: IngestJobCopyInput,
    ) -> Result<JobCopy, DeliveryServiceError> {
        let mut copy = self
            .repo
            .upsert(&NewJobCopy {
                job_id: input.job_id.clone(),
                client_name: input.client_name,
                payload: input.payload.clone(),
                delivery_mode: self.default_mode,
            })
            .await?;

        match self.mirror.save(&input.job_id, &input.payload).await {
            Ok(path) => {
                self.repo.set_on_disk_path(&input.job_id, &path).await?;
                copy.on_disk_path = Some(path);
            }
            Err(e) => {
                tracing::warn!(job_id = %input.job_id, error = %e, "payload mirror write failed");
            }
        }
        Ok(copy)
    }
}
