use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::eto::error::EtoError;

/// Latitude of the reference station (degrees north)
pub const DEFAULT_LATITUDE_DEG: f64 = 14.0;
/// Elevation of the reference station above sea level (meters)
pub const DEFAULT_ELEVATION_M: f64 = 8.0;
/// Sampling interval the radiation rescale was calibrated for
pub const DEFAULT_CADENCE_MINUTES: f64 = 5.0;

/// One telemetry reading from the weather station
///
/// Timestamps are naive local times; the whole series must share one
/// timezone. Radiation is the energy received over the sample's interval
/// in kJ/m² as exported by the logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub pressure_kpa: f64,
    pub radiation_kj: f64,
}

impl Sample {
    pub fn new(
        timestamp: NaiveDateTime,
        temperature_c: f64,
        humidity_pct: f64,
        wind_speed_ms: f64,
        pressure_kpa: f64,
        radiation_kj: f64,
    ) -> Self {
        Self {
            timestamp,
            temperature_c,
            humidity_pct,
            wind_speed_ms,
            pressure_kpa,
            radiation_kj,
        }
    }

    /// Check that every field is finite and physically plausible
    ///
    /// `row` is the caller's row number, reported back in the error so the
    /// offending line of the source table can be found.
    pub fn validate(&self, row: usize) -> Result<(), EtoError> {
        let fields = [
            ("Temperature", self.temperature_c),
            ("Humidity", self.humidity_pct),
            ("Wind Speed", self.wind_speed_ms),
            ("Pressure Air", self.pressure_kpa),
            ("Radiant (kJ)", self.radiation_kj),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EtoError::invalid_sample(row, field, "value is not a finite number"));
            }
        }

        if self.temperature_c <= -273.0 {
            return Err(EtoError::invalid_sample(
                row,
                "Temperature",
                format!("{} °C is below absolute zero", self.temperature_c),
            ));
        }
        if !(0.0..=100.0).contains(&self.humidity_pct) {
            return Err(EtoError::invalid_sample(
                row,
                "Humidity",
                format!("{} % is outside 0-100", self.humidity_pct),
            ));
        }
        if self.wind_speed_ms < 0.0 {
            return Err(EtoError::invalid_sample(
                row,
                "Wind Speed",
                format!("{} m/s is negative", self.wind_speed_ms),
            ));
        }
        if self.pressure_kpa <= 0.0 {
            return Err(EtoError::invalid_sample(
                row,
                "Pressure Air",
                format!("{} kPa is not positive", self.pressure_kpa),
            ));
        }
        if self.radiation_kj < 0.0 {
            return Err(EtoError::invalid_sample(
                row,
                "Radiant (kJ)",
                format!("{} kJ is negative", self.radiation_kj),
            ));
        }

        Ok(())
    }
}

/// Fixed properties of the station, supplied with every estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteConstants {
    pub latitude_deg: f64,
    pub elevation_m: f64,
    pub cadence_minutes: f64,
}

impl SiteConstants {
    pub fn new(latitude_deg: f64, elevation_m: f64) -> Self {
        Self {
            latitude_deg,
            elevation_m,
            cadence_minutes: DEFAULT_CADENCE_MINUTES,
        }
    }

    pub fn with_cadence_minutes(mut self, cadence_minutes: f64) -> Self {
        self.cadence_minutes = cadence_minutes;
        self
    }

    /// Rescale the day's summed radiation (MJ/m²) into the shortwave term of
    /// the radiation balance
    ///
    /// At the 5-minute cadence this is `rn_total * 60 / 1e6`, evaluated in
    /// that order. The multiplier scales linearly with the interval length.
    pub fn scaled_radiation(&self, rn_total: f64) -> f64 {
        rn_total * (12.0 * self.cadence_minutes) / 1_000_000.0
    }
}

impl Default for SiteConstants {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE_DEG, DEFAULT_ELEVATION_M)
    }
}
