use chrono::{DateTime, Utc};

use crate::domain::repository::{JobCopyRepository, PayloadMirror};
use crate::error::DeliveryServiceError;

/// Permanently destroy quarantined job copies whose 48h window has elapsed,
/// plus their mirror artifacts. Overlapping runs are harmless: the purge is
/// a set operation and removing an already-removed record or file is a
/// no-op.
pub struct PurgeExpiredUseCase<R, M>
where
    R: JobCopyRepository,
    M: PayloadMirror,
{
    pub repo: R,
    pub mirror: M,
}

impl<R, M> PurgeExpiredUseCase<R, M>
where
    R: JobCopyRepository,
    M: PayloadMirror,
{
    /// Returns the number of records purged.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<u64, DeliveryServiceError> {
        let purged = self.repo.purge_expired(now).await?;
        for copy in &purged {
            if let Err(e) = self.mirror.remove(&copy.job_id).await {
                tracing::warn!(job_id = %copy.job_id, error = %e, "mirror cleanup failed after purge");
            }
        }
        if !purged.is_empty() {
            tracing::info!(count = purged.len(), "purged expired job copies");
        }
        Ok(purged.len() as u64)
    }
}
