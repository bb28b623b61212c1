// Shared fixtures for integration tests
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use eto_daily_service::eto::Sample;
use std::io::Write;
use tempfile::NamedTempFile;

pub const CSV_HEADER: &str =
    "timestamp,Wind Speed,Temperature,Humidity,Pressure Air,Radiant (W),Radiant (kJ)";

/// ETo of the reference day below at 14° N, 8 m
pub const SCENARIO_ETO_MM: f64 = 2.2151626877982302;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap()
}

/// `count` identical samples every 5 minutes starting at `start`
pub fn constant_samples(
    start: NaiveDateTime,
    count: usize,
    temperature_c: f64,
    humidity_pct: f64,
    radiation_kj: f64,
) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            Sample::new(
                start + Duration::minutes(5 * i as i64),
                temperature_c,
                humidity_pct,
                2.0,
                101.3,
                radiation_kj,
            )
        })
        .collect()
}

/// One full agronomic day (2026-06-22): 288 samples from 2026-06-21 07:00
/// at 25 °C, 60 %, 2.0 m/s, 101.3 kPa, 15 MJ/m² in total
pub fn scenario_samples() -> Vec<Sample> {
    constant_samples(at(2026, 6, 21, 7, 0, 0), 288, 25.0, 60.0, 15000.0 / 288.0)
}

pub fn samples_to_csv(samples: &[Sample]) -> String {
    let mut csv = format!("{CSV_HEADER}\n");
    for s in samples {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            s.timestamp.format("%Y-%m-%d %H:%M:%S"),
            s.wind_speed_ms,
            s.temperature_c,
            s.humidity_pct,
            s.pressure_kpa,
            s.radiation_kj / 0.3,
            s.radiation_kj,
        ));
    }
    csv
}

pub fn write_csv_fixture(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write fixture");
    file.flush().expect("Failed to flush fixture");
    file
}

pub fn scenario_csv_file() -> NamedTempFile {
    write_csv_fixture(&samples_to_csv(&scenario_samples()))
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}
