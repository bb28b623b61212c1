use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::eto::sample::{DEFAULT_CADENCE_MINUTES, DEFAULT_ELEVATION_M, DEFAULT_LATITUDE_DEG};
use crate::eto::SiteConstants;
use crate::source::SampleSource;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub sample_source: SampleSource,
    pub site_latitude: f64,
    pub site_elevation_m: f64,
    pub sample_cadence_minutes: f64,
    pub refresh_interval_minutes: u64,
    /// 0 disables expiry
    pub cache_max_age_minutes: u64,
    pub estimation_concurrency: usize,
    pub fetch_max_retries: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Either SAMPLE_SOURCE_FILE or SAMPLE_SOURCE_URL must be set")]
    MissingSampleSource,
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let sheet = env::var("SAMPLE_SOURCE_SHEET").ok();
        let sample_source = match (env::var("SAMPLE_SOURCE_FILE"), env::var("SAMPLE_SOURCE_URL")) {
            (Ok(file), _) => SampleSource::from_path(PathBuf::from(file), sheet),
            (Err(_), Ok(url)) => SampleSource::Url(url),
            (Err(_), Err(_)) => return Err(ConfigError::MissingSampleSource),
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: var_or("SERVER_PORT", 8080),
            sample_source,
            site_latitude: var_or("SITE_LATITUDE", DEFAULT_LATITUDE_DEG),
            site_elevation_m: var_or("SITE_ELEVATION_M", DEFAULT_ELEVATION_M),
            sample_cadence_minutes: var_or("SAMPLE_CADENCE_MINUTES", DEFAULT_CADENCE_MINUTES),
            refresh_interval_minutes: var_or("REFRESH_INTERVAL_MINUTES", 15),
            cache_max_age_minutes: var_or("CACHE_MAX_AGE_MINUTES", 60),
            estimation_concurrency: var_or("ESTIMATION_CONCURRENCY", 8),
            fetch_max_retries: var_or("FETCH_MAX_RETRIES", 3),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn site(&self) -> SiteConstants {
        SiteConstants::new(self.site_latitude, self.site_elevation_m)
            .with_cadence_minutes(self.sample_cadence_minutes)
    }

    pub fn cache_max_age(&self) -> Option<Duration> {
        match self.cache_max_age_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        }
    }
}
