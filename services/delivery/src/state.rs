use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::DeliveryConfig;
use crate::infra::archive::HttpArchiveStore;
use crate::infra::db::DbJobCopyRepository;
use crate::infra::disk::PayloadDiskMirror;
use crate::infra::http::{HttpDeliveryTransport, HttpSiteProbe};
use crate::usecase::dispatch::DispatchPolicy;
use crate::usecase::site_check::SiteCheckPolicy;

/// Shared application state passed to every handler via axum `State`, and to
/// the worker/beat loops.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<DeliveryConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: DeliveryConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    pub fn repo(&self) -> DbJobCopyRepository {
        DbJobCopyRepository {
            db: self.db.clone(),
        }
    }

    pub fn mirror(&self) -> PayloadDiskMirror {
        PayloadDiskMirror::new(self.config.payload_disk_dir.clone())
    }

    pub fn transport(&self) -> HttpDeliveryTransport {
        HttpDeliveryTransport::new(self.http.clone(), self.config.delivery_http_timeout)
    }

    pub fn probe(&self) -> HttpSiteProbe {
        HttpSiteProbe::new(self.http.clone(), self.config.site_check_timeout)
    }

    pub fn archive(&self) -> HttpArchiveStore {
        HttpArchiveStore::new(
            self.http.clone(),
            self.config.s3_bucket_url.clone().unwrap_or_default(),
        )
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            targets: self.config.delivery_targets(),
            archive_enabled: self.config.archive_to_s3_on_send
                && self.config.s3_bucket_url.is_some(),
            delivered_prefix: self.config.s3_delivered_prefix.clone(),
            site_check_initial_interval_seconds: self.config.site_check_initial_interval_seconds,
        }
    }

    pub fn site_check_policy(&self) -> SiteCheckPolicy {
        SiteCheckPolicy {
            initial_attempts: self.config.site_check_initial_attempts,
            initial_interval_seconds: self.config.site_check_initial_interval_seconds,
            long_interval_seconds: self.config.site_check_long_interval_seconds,
        }
    }
}
