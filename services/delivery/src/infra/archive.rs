use anyhow::Context as _;

use crate::domain::repository::ArchiveStore;

/// Cold-storage archive speaking plain HTTP PUT against an S3-compatible
/// bucket endpoint (`S3_BUCKET_URL`), keyed `{prefix}{job_id}`.
#[derive(Clone)]
pub struct HttpArchiveStore {
    client: reqwest::Client,
    bucket_url: String,
}

impl HttpArchiveStore {
    pub fn new(client: reqwest::Client, bucket_url: impl Into<String>) -> Self {
        let mut bucket_url = bucket_url.into();
        while bucket_url.ends_with('/') {
            bucket_url.pop();
        }
        Self { client, bucket_url }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.bucket_url, key.trim_start_matches('/'))
    }
}

impl ArchiveStore for HttpArchiveStore {
    async fn put(&self, key: &str, payload: &serde_json::Value) -> anyhow::Result<()> {
        let url = self.object_url(key);
        let resp = self
            .client
            .put(&url)
            .header("content-type", "application/json; charset=utf-8")
            .json(payload)
            .send()
            .await
            .with_context(|| format!("archive PUT {url}"))?;
        let status = resp.status();
        anyhow::ensure!(status.is_success(), "archive PUT {url} returned {status}");
        Ok(())
    }
}
