use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, instrument, warn};

use crate::eto::error::EtoError;
use crate::eto::sample::{Sample, SiteConstants};
use crate::eto::solar::{
    clear_sky_radiation, day_of_year, extraterrestrial_radiation, inverse_relative_distance,
    net_longwave_radiation, net_radiation, solar_declination, sunset_hour_angle,
};
use crate::eto::vapor::{
    actual_vapor_pressure, psychrometric_constant, saturation_slope, saturation_vapor_pressure,
};
use crate::eto::windower::{daily_windows, DayWindow};

/// Daily aggregates of one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyAggregates {
    /// Earliest sample in the aggregated set
    pub first_timestamp: NaiveDateTime,
    pub t_max: f64,
    pub t_min: f64,
    pub rh_max: f64,
    pub rh_min: f64,
    pub u2_mean: f64,
    pub p_mean: f64,
    /// Sum of the samples' radiation after kJ -> MJ conversion (MJ/m²)
    pub rn_total: f64,
}

impl DailyAggregates {
    /// Aggregate a non-empty set of samples, `None` if empty
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let n = samples.len() as f64;

        let mut aggregates = DailyAggregates {
            first_timestamp: first.timestamp,
            t_max: first.temperature_c,
            t_min: first.temperature_c,
            rh_max: first.humidity_pct,
            rh_min: first.humidity_pct,
            u2_mean: 0.,
            p_mean: 0.,
            rn_total: 0.,
        };
        let mut wind_sum = 0.;
        let mut pressure_sum = 0.;

        for sample in samples {
            aggregates.first_timestamp = aggregates.first_timestamp.min(sample.timestamp);
            aggregates.t_max = aggregates.t_max.max(sample.temperature_c);
            aggregates.t_min = aggregates.t_min.min(sample.temperature_c);
            aggregates.rh_max = aggregates.rh_max.max(sample.humidity_pct);
            aggregates.rh_min = aggregates.rh_min.min(sample.humidity_pct);
            wind_sum += sample.wind_speed_ms;
            pressure_sum += sample.pressure_kpa;
            aggregates.rn_total += sample.radiation_kj / 1000.; // kJ -> MJ
        }

        aggregates.u2_mean = wind_sum / n;
        aggregates.p_mean = pressure_sum / n;
        Some(aggregates)
    }

    pub fn t_mean(&self) -> f64 {
        (self.t_max + self.t_min) / 2.
    }

    pub fn rh_mean(&self) -> f64 {
        (self.rh_max + self.rh_min) / 2.
    }
}

/// Every named term of the Penman-Monteith evaluation, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Intermediates {
    pub t_max: f64,
    pub t_min: f64,
    pub rh_max: f64,
    pub rh_min: f64,
    /// Slope of the saturation vapor pressure curve (kPa/°C)
    pub delta: f64,
    pub es_max: f64,
    pub es_min: f64,
    /// Mean saturation vapor pressure (kPa)
    pub es: f64,
    /// Actual vapor pressure (kPa)
    pub ea: f64,
    /// Psychrometric constant (kPa/°C)
    pub gamma: f64,
    /// Calendar date the day-of-year was taken from
    pub reference_date: NaiveDate,
    pub day_of_year: i32,
    /// Solar declination (rad)
    pub solar_declination: f64,
    /// Sunset hour angle (rad)
    pub sunset_hour_angle: f64,
    /// Inverse relative distance Earth-Sun
    pub dr: f64,
    /// Extraterrestrial radiation (MJ m^-2 day^-1)
    pub ra: f64,
    /// Clear-sky radiation (MJ m^-2 day^-1)
    pub rso: f64,
    /// Rescaled shortwave radiation entering the balance
    pub rs: f64,
    /// Net outgoing long-wave radiation
    pub rnl: f64,
    /// Net radiation
    pub rn: f64,
}

/// ETo for one agronomic day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    /// Reference evapotranspiration (mm/day)
    pub eto_mm: f64,
    pub t_mean: f64,
    pub rh_mean: f64,
    pub u2_mean: f64,
    pub p_mean: f64,
    pub rn_total: f64,
    pub sample_count: usize,
    pub intermediates: Intermediates,
}

/// Estimate ETo for one day window
///
/// Pure: the same window and site always give the same result. The
/// day-of-year is taken from the first sample's calendar date.
///
/// Fails with `NonFinite` when the day has no clear-sky radiation (polar
/// night) or the combination does not yield a finite number.
#[instrument(skip(window, site), fields(date = %window.date, samples = window.len()))]
pub fn estimate(window: &DayWindow, site: &SiteConstants) -> Result<DailyResult, EtoError> {
    let agg = DailyAggregates::from_samples(&window.samples).ok_or_else(|| {
        warn!("Refusing to estimate ETo from an empty window");
        EtoError::EmptyWindow { date: window.date }
    })?;

    let t_mean = agg.t_mean();
    let rh_mean = agg.rh_mean();

    // thermodynamic terms
    let delta = saturation_slope(t_mean);
    let es_max = saturation_vapor_pressure(agg.t_max);
    let es_min = saturation_vapor_pressure(agg.t_min);
    let es = (es_max + es_min) / 2.;
    let ea = actual_vapor_pressure(es_min, es_max, agg.rh_max, agg.rh_min);
    let gamma = psychrometric_constant(agg.p_mean);

    // solar geometry
    let reference_date = agg.first_timestamp.date();
    let j = day_of_year(reference_date);
    let declination = solar_declination(j);
    let lat_rad = PI * site.latitude_deg / 180.;
    let sunset = sunset_hour_angle(lat_rad, declination);
    let dr = inverse_relative_distance(j);
    let ra = extraterrestrial_radiation(lat_rad, declination, sunset, dr);
    let rso = clear_sky_radiation(ra, site.elevation_m);
    if !rso.is_finite() || rso <= 0. {
        return Err(non_finite(window.date, "Rso", rso));
    }

    // radiation balance
    let rs = site.scaled_radiation(agg.rn_total);
    let rnl = net_longwave_radiation(agg.t_max, agg.t_min, ea, rs, rso);
    let rn = net_radiation(rs, rnl);

    let eto_mm = (0.408 * delta * rn
        + gamma * (900. / (t_mean + 273.)) * agg.u2_mean * (es - ea))
        / (delta + gamma * (1. + 0.34 * agg.u2_mean));
    if !eto_mm.is_finite() {
        return Err(non_finite(window.date, "ETo", eto_mm));
    }

    debug!(
        "ETo {:.3} mm/day (T_mean={:.2}, RH_mean={:.2}, u2={:.2}, Rn_total={:.3}, J={})",
        eto_mm, t_mean, rh_mean, agg.u2_mean, agg.rn_total, j
    );

    Ok(DailyResult {
        date: window.date,
        eto_mm,
        t_mean,
        rh_mean,
        u2_mean: agg.u2_mean,
        p_mean: agg.p_mean,
        rn_total: agg.rn_total,
        sample_count: window.len(),
        intermediates: Intermediates {
            t_max: agg.t_max,
            t_min: agg.t_min,
            rh_max: agg.rh_max,
            rh_min: agg.rh_min,
            delta,
            es_max,
            es_min,
            es,
            ea,
            gamma,
            reference_date,
            day_of_year: j,
            solar_declination: declination,
            sunset_hour_angle: sunset,
            dr,
            ra,
            rso,
            rs,
            rnl,
            rn,
        },
    })
}

fn non_finite(date: NaiveDate, term: &str, value: f64) -> EtoError {
    warn!("{} is {} for {}, omitting the day", term, value, date);
    EtoError::NonFinite {
        date,
        term: term.to_string(),
        value,
    }
}

/// Window and estimate every day of a sample table, in date order
///
/// Days without samples, or whose estimate is not computable, are absent
/// from the output.
pub fn estimate_days(samples: &[Sample], site: &SiteConstants) -> Vec<DailyResult> {
    daily_windows(samples)
        .iter()
        .filter_map(|window| estimate(window, site).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 21)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    fn window_of(samples: Vec<Sample>) -> DayWindow {
        DayWindow {
            date: NaiveDate::from_ymd_opt(2026, 6, 22).unwrap(),
            start: start(),
            end: start() + Duration::days(1),
            samples,
        }
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let window = window_of(vec![]);
        let result = estimate(&window, &SiteConstants::default());
        assert!(matches!(result, Err(EtoError::EmptyWindow { .. })));
    }

    #[test]
    fn test_aggregates_use_extremes_and_means() {
        let samples = vec![
            Sample::new(start(), 20.0, 80.0, 1.0, 100.0, 1000.0),
            Sample::new(start() + Duration::hours(6), 30.0, 40.0, 3.0, 102.0, 2000.0),
        ];
        let agg = DailyAggregates::from_samples(&samples).unwrap();
        assert_eq!(agg.t_max, 30.0);
        assert_eq!(agg.t_min, 20.0);
        assert_eq!(agg.rh_max, 80.0);
        assert_eq!(agg.rh_min, 40.0);
        assert_eq!(agg.u2_mean, 2.0);
        assert_eq!(agg.p_mean, 101.0);
        assert_eq!(agg.rn_total, 3.0);
        assert_eq!(agg.t_mean(), 25.0);
        assert_eq!(agg.rh_mean(), 60.0);
    }

    #[test]
    fn test_aggregates_track_earliest_sample() {
        let samples = vec![
            Sample::new(start() + Duration::hours(3), 20.0, 80.0, 1.0, 100.0, 0.0),
            Sample::new(start(), 22.0, 70.0, 1.0, 100.0, 0.0),
        ];
        let agg = DailyAggregates::from_samples(&samples).unwrap();
        assert_eq!(agg.first_timestamp, start());
    }

    #[test]
    fn test_polar_night_is_not_computable() {
        let night = NaiveDate::from_ymd_opt(2026, 12, 20)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let window = DayWindow {
            date: NaiveDate::from_ymd_opt(2026, 12, 21).unwrap(),
            start: night,
            end: night + Duration::days(1),
            samples: vec![Sample::new(night, -20.0, 80.0, 3.0, 100.0, 0.0)],
        };
        let result = estimate(&window, &SiteConstants::new(80.0, 8.0));
        match result {
            Err(EtoError::NonFinite { term, value, .. }) => {
                assert_eq!(term, "Rso");
                assert_eq!(value, 0.0);
            }
            other => panic!("Expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregates_of_empty_slice() {
        assert!(DailyAggregates::from_samples(&[]).is_none());
    }

    #[test]
    fn test_day_of_year_from_first_sample() {
        let window = window_of(vec![Sample::new(start(), 25.0, 60.0, 2.0, 101.3, 100.0)]);
        let result = estimate(&window, &SiteConstants::default()).unwrap();
        assert_eq!(result.intermediates.day_of_year, 172);
        assert_eq!(
            result.intermediates.reference_date,
            NaiveDate::from_ymd_opt(2026, 6, 21).unwrap()
        );
    }

    #[test]
    fn test_result_carries_window_date_and_count() {
        let window = window_of(vec![
            Sample::new(start(), 25.0, 60.0, 2.0, 101.3, 100.0),
            Sample::new(start() + Duration::minutes(5), 25.0, 60.0, 2.0, 101.3, 100.0),
        ]);
        let result = estimate(&window, &SiteConstants::default()).unwrap();
        assert_eq!(result.date, NaiveDate::from_ymd_opt(2026, 6, 22).unwrap());
        assert_eq!(result.sample_count, 2);
    }
}
