use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument, warn};

use crate::services::EtoService;

/// Reload the sample table every `interval_minutes`, forever
///
/// Failures are logged and the previously loaded table keeps serving.
#[instrument(skip(eto_service), fields(interval_minutes = %interval_minutes))]
pub async fn start_refresh_scheduler(eto_service: EtoService, interval_minutes: u64) {
    let mut interval = time::interval(Duration::from_secs(interval_minutes.max(1) * 60));

    info!(
        "Refresh scheduler started with {} minute interval",
        interval_minutes
    );

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing sample table");

        match eto_service.refresh().await {
            Ok(0) => warn!("Sample source returned no samples"),
            Ok(count) => info!("Sample table refreshed with {} samples", count),
            Err(e) => error!("Failed to refresh sample table: {}", e),
        }
    }
}
