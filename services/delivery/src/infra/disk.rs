use std::path::PathBuf;

use anyhow::Context as _;

use crate::domain::repository::PayloadMirror;

/// On-disk payload mirror under `PAYLOAD_DISK_DIR/payloads/{job_id}.json`.
///
/// Writes go through a tmp file + atomic rename so readers never observe a
/// half-written artifact. The canonical database record stays authoritative;
/// anything that goes wrong here is the caller's to log and ignore.
#[derive(Clone)]
pub struct PayloadDiskMirror {
    base_dir: PathBuf,
}

impl PayloadDiskMirror {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn payload_dir(&self) -> PathBuf {
        self.base_dir.join("payloads")
    }

    pub fn path_for(&self, job_id: &str) -> PathBuf {
        self.payload_dir().join(format!("{job_id}.json"))
    }
}

impl PayloadMirror for PayloadDiskMirror {
    async fn save(&self, job_id: &str, payload: &serde_json::Value) -> anyhow::Result<String> {
        anyhow::ensure!(!job_id.trim().is_empty(), "job_id missing for payload path");
        let dir = self.payload_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create mirror dir {}", dir.display()))?;
        let path = self.path_for(job_id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec(payload).context("serialize mirror payload")?;
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write mirror tmp {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("rename mirror into place {}", path.display()))?;
        tracing::info!(job_id, path = %path.display(), bytes = body.len(), "payload mirrored");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn load(&self, job_id: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let path = self.path_for(job_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("parse mirror {}", path.display()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read mirror {}", path.display())),
        }
    }

    async fn remove(&self, job_id: &str) -> anyhow::Result<()> {
        let path = self.path_for(job_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove mirror {}", path.display())),
        }
    }
}
