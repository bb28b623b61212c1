use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::cache::SampleCache;
use crate::config::Config;
use crate::scheduler;
use crate::services::EtoService;

/// Application with all spawned background tasks and server
///
/// Holds the task handles so callers can await or abort them.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub refresh_scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// Creates the sample cache and ETo service, then spawns:
    /// - HTTP API server (Axum)
    /// - Sample refresh scheduler (default 15 min interval)
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let cache = SampleCache::new(config.cache_max_age());
        let eto_service = EtoService::new(config.sample_source.clone(), config.site(), cache)
            .with_concurrency(config.estimation_concurrency)
            .with_max_retries(config.fetch_max_retries);
        info!(
            "Serving ETo for source {} at {:?}",
            eto_service.source().id(),
            eto_service.site()
        );

        let refresh_scheduler_handle = {
            let eto_service_clone = eto_service.clone();
            let interval = config.refresh_interval_minutes;

            tokio::spawn(async move {
                scheduler::start_refresh_scheduler(eto_service_clone, interval).await;
            })
        };

        let app_state = AppState { eto_service };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            refresh_scheduler_handle,
        })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        self.refresh_scheduler_handle.abort();
        Ok(())
    }
}
