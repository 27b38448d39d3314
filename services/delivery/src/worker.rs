use std::time::Duration;

use chrono::Utc;

use crate::state::AppState;
use crate::usecase::retention::PurgeExpiredUseCase;
use crate::usecase::site_check::SiteCheckUseCase;

/// How often the worker polls for due site checks. The probe schedule itself
/// lives in the database, so the poll cadence only bounds added latency.
const SITE_CHECK_POLL_SECONDS: u64 = 30;
const SITE_CHECK_BATCH: u64 = 50;

const PURGE_INTERVAL_SECONDS: u64 = 3600;

/// Background-worker role: drain due site-check probes forever.
pub async fn run_worker(state: AppState) {
    let probe = state.probe();
    let policy = state.site_check_policy();
    let mut interval = tokio::time::interval(Duration::from_secs(SITE_CHECK_POLL_SECONDS));
    loop {
        interval.tick().await;
        let usecase = SiteCheckUseCase {
            repo: state.repo(),
            probe: probe.clone(),
            policy,
        };
        match usecase.run_due(Utc::now(), SITE_CHECK_BATCH).await {
            Ok(stats) if stats.probed > 0 => {
                tracing::info!(
                    probed = stats.probed,
                    reachable = stats.reachable,
                    unreachable = stats.unreachable,
                    skipped = stats.skipped,
                    "site-check pass complete"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "site-check pass failed"),
        }
    }
}

/// Periodic-scheduler role: purge quarantined job copies past retention.
pub async fn run_beat(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECONDS));
    loop {
        interval.tick().await;
        let usecase = PurgeExpiredUseCase {
            repo: state.repo(),
            mirror: state.mirror(),
        };
        if let Err(e) = usecase.execute(Utc::now()).await {
            tracing::error!(error = %e, "retention purge failed");
        }
    }
}
