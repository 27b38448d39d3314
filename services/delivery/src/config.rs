use std::path::PathBuf;

use crate::domain::resolver::DeliveryTargets;
use crate::domain::types::DeliveryMode;

/// Delivery service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 8080). Env var: `DELIVERY_PORT`.
    pub port: u16,
    /// Default delivery mode for new jobs. Env var: `DELIVERY_MODE`.
    pub delivery_mode: DeliveryMode,
    /// Base URL template with `{slug}` placeholder.
    pub base_url_template: Option<String>,
    /// Namespace substituted into the target path template.
    pub target_namespace: Option<String>,
    /// Target path template with `{namespace}` placeholder.
    pub target_path_template: String,
    /// Prefill delivery URL for `zapier` mode.
    pub zapier_webhook_url: Option<String>,
    /// Outbound delivery call timeout in seconds (default 30).
    pub delivery_http_timeout: u64,
    /// Root for the on-disk payload mirror.
    pub payload_disk_dir: PathBuf,
    /// Copy delivered payloads to cold storage after a successful send.
    pub archive_to_s3_on_send: bool,
    /// Object key prefix for archived payloads (default `delivered/`).
    pub s3_delivered_prefix: String,
    /// S3-compatible endpoint archive objects are PUT to, including bucket.
    pub s3_bucket_url: Option<String>,
    /// Domain delivered sites are probed under.
    pub preview_base_domain: Option<String>,
    /// Optional subdomain segment between slug and preview domain.
    pub preview_namespace: Option<String>,
    /// Per-probe timeout in seconds (default 10).
    pub site_check_timeout: u64,
    /// Seconds between initial-phase probes (default 300).
    pub site_check_initial_interval_seconds: u64,
    /// Number of initial-phase probes before escalating (default 12).
    pub site_check_initial_attempts: i32,
    /// Seconds between long-phase probes (default 3600).
    pub site_check_long_interval_seconds: u64,
    /// Run schema migrations at startup (default on). Env var: `RUN_MIGRATIONS`.
    pub run_migrations: bool,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env_opt(key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

impl DeliveryConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            port: env_parsed("DELIVERY_PORT", 8080),
            delivery_mode: env_opt("DELIVERY_MODE")
                .and_then(|v| DeliveryMode::parse(&v))
                .unwrap_or_default(),
            base_url_template: env_opt("DELIVERY_BASE_URL_TEMPLATE"),
            target_namespace: env_opt("DELIVERY_TARGET_NAMESPACE"),
            target_path_template: env_opt("DELIVERY_TARGET_PATH_TEMPLATE")
                .unwrap_or_else(|| "/wp-json/{namespace}/v1/content".to_owned()),
            zapier_webhook_url: env_opt("ZAPIER_WEBHOOK_URL"),
            delivery_http_timeout: env_parsed("DELIVERY_HTTP_TIMEOUT", 30),
            payload_disk_dir: env_opt("PAYLOAD_DISK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/var/data/procontentapi")),
            archive_to_s3_on_send: env_flag("ARCHIVE_TO_S3_ON_SEND", false),
            s3_delivered_prefix: env_opt("S3_DELIVERED_PREFIX")
                .unwrap_or_else(|| "delivered/".to_owned()),
            s3_bucket_url: env_opt("S3_BUCKET_URL"),
            preview_base_domain: env_opt("PREVIEW_BASE_DOMAIN"),
            preview_namespace: env_opt("PREVIEW_NAMESPACE"),
            site_check_timeout: env_parsed("SITE_CHECK_TIMEOUT", 10),
            site_check_initial_interval_seconds: env_parsed(
                "SITE_CHECK_INITIAL_INTERVAL_SECONDS",
                300,
            ),
            site_check_initial_attempts: env_parsed("SITE_CHECK_INITIAL_ATTEMPTS", 12),
            site_check_long_interval_seconds: env_parsed("SITE_CHECK_LONG_INTERVAL_SECONDS", 3600),
            run_migrations: env_flag("RUN_MIGRATIONS", true),
        }
    }

    /// The resolver's view of this configuration.
    pub fn delivery_targets(&self) -> DeliveryTargets {
        DeliveryTargets {
            base_url_template: self.base_url_template.clone(),
            namespace: self.target_namespace.clone(),
            path_template: self.target_path_template.clone(),
            zapier_webhook_url: self.zapier_webhook_url.clone(),
            preview_base_domain: self.preview_base_domain.clone(),
            preview_namespace: self.preview_namespace.clone(),
        }
    }
}
