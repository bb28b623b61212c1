// Config::from_env tests; environment is process-global so these run serially

use eto_daily_service::config::{Config, ConfigError};
use eto_daily_service::source::SampleSource;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const VARS: [&str; 12] = [
    "SERVER_HOST",
    "SERVER_PORT",
    "SAMPLE_SOURCE_URL",
    "SAMPLE_SOURCE_FILE",
    "SAMPLE_SOURCE_SHEET",
    "SITE_LATITUDE",
    "SITE_ELEVATION_M",
    "SAMPLE_CADENCE_MINUTES",
    "REFRESH_INTERVAL_MINUTES",
    "CACHE_MAX_AGE_MINUTES",
    "ESTIMATION_CONCURRENCY",
    "FETCH_MAX_RETRIES",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_with_url_source() {
    clear_env();
    env::set_var("SAMPLE_SOURCE_URL", "https://example.com/export?format=csv");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server_addr(), "0.0.0.0:8080");
    assert_eq!(
        config.sample_source,
        SampleSource::Url("https://example.com/export?format=csv".to_string())
    );
    assert_eq!(config.site_latitude, 14.0);
    assert_eq!(config.site_elevation_m, 8.0);
    assert_eq!(config.sample_cadence_minutes, 5.0);
    assert_eq!(config.refresh_interval_minutes, 15);
    assert_eq!(config.cache_max_age(), Some(Duration::from_secs(3600)));
    assert_eq!(config.estimation_concurrency, 8);
    assert_eq!(config.fetch_max_retries, 3);

    clear_env();
}

#[test]
#[serial]
fn test_file_source_takes_precedence() {
    clear_env();
    env::set_var("SAMPLE_SOURCE_URL", "https://example.com/export?format=csv");
    env::set_var("SAMPLE_SOURCE_FILE", "/data/station.xlsx");
    env::set_var("SAMPLE_SOURCE_SHEET", "June");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.sample_source,
        SampleSource::Workbook {
            path: PathBuf::from("/data/station.xlsx"),
            sheet: Some("June".to_string()),
        }
    );

    clear_env();
}

#[test]
#[serial]
fn test_missing_source_is_an_error() {
    clear_env();
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::MissingSampleSource)
    ));
}

#[test]
#[serial]
fn test_overrides_and_fallbacks() {
    clear_env();
    env::set_var("SAMPLE_SOURCE_FILE", "/data/station.csv");
    env::set_var("SERVER_PORT", "not-a-port");
    env::set_var("SITE_LATITUDE", "-33.9");
    env::set_var("SITE_ELEVATION_M", "120");
    env::set_var("SAMPLE_CADENCE_MINUTES", "10");
    env::set_var("CACHE_MAX_AGE_MINUTES", "0");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server_port, 8080);
    assert_eq!(
        config.sample_source,
        SampleSource::CsvFile(PathBuf::from("/data/station.csv"))
    );
    let site = config.site();
    assert_eq!(site.latitude_deg, -33.9);
    assert_eq!(site.elevation_m, 120.0);
    assert_eq!(site.cadence_minutes, 10.0);
    assert_eq!(config.cache_max_age(), None);

    clear_env();
}
