//! Solar geometry and radiation balance terms (FAO-56, chapter 3)

use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

const STEFAN_BOLTZMANN: f64 = 4.903e-9; // MJ K^-4 m^-2 day^-1
const ALBEDO: f64 = 0.23; // grass reference crop

/// Day-of-year ordinal from the calendar approximation used by the
/// station's historical ETo records
///
/// This is not an exact ordinal: it is one short at the start of the year
/// and in leap years. Every quotient term truncates toward zero.
pub fn day_of_year(date: NaiveDate) -> i32 {
    let day = date.day() as f64;
    let month = date.month() as f64;
    let year = date.year().rem_euclid(4) as f64;

    let j = (day - 32.)
        + (275. * month / 9.).trunc()
        + 2. * (3. / (month + 1.)).trunc()
        + (month / 10. - year / 4. - 0.975).trunc();
    j as i32
}

/// Solar declination (rad)
pub fn solar_declination(j: i32) -> f64 {
    0.409 * (2. * PI / 365. * j as f64 - 1.39).sin()
}

/// Sunset hour angle (rad) for a latitude in radians
///
/// The acos argument is clamped so polar day/night yield pi/0 instead of NaN.
pub fn sunset_hour_angle(lat_rad: f64, declination: f64) -> f64 {
    (-lat_rad.tan() * declination.tan()).clamp(-1., 1.).acos()
}

/// Inverse relative distance Earth-Sun
pub fn inverse_relative_distance(j: i32) -> f64 {
    1. + 0.033 * (2. * PI * j as f64 / 365.).cos()
}

/// Extraterrestrial radiation (MJ m^-2 day^-1)
///
/// `24 * 4.92 / pi` is the `24 * 60 / pi * Gsc` factor with the solar
/// constant Gsc = 0.082 MJ m^-2 min^-1 folded in.
pub fn extraterrestrial_radiation(lat_rad: f64, declination: f64, sunset: f64, dr: f64) -> f64 {
    24. * 4.92 * dr / PI
        * (sunset * lat_rad.sin() * declination.sin()
            + lat_rad.cos() * declination.cos() * sunset.sin())
}

/// Clear-sky radiation from extraterrestrial radiation and elevation (m)
pub fn clear_sky_radiation(ra: f64, elevation_m: f64) -> f64 {
    (0.75 + 0.00002 * elevation_m) * ra
}

/// Net outgoing long-wave radiation
///
/// `rs` is the rescaled shortwave term (see `SiteConstants::scaled_radiation`).
/// Powers use `powf`, matching the historical records bit for bit.
pub fn net_longwave_radiation(t_max: f64, t_min: f64, ea: f64, rs: f64, rso: f64) -> f64 {
    STEFAN_BOLTZMANN
        * (((t_max + 273.).powf(4.) + (t_min + 273.).powf(4.)) / 2.)
        * (0.34 - 0.14 * ea.sqrt())
        * (1.35 * (rs / rso) - 0.35)
}

/// Net radiation at the crop surface
pub fn net_radiation(rs: f64, rnl: f64) -> f64 {
    (1. - ALBEDO) * rs - rnl
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_of_year_midsummer() {
        assert_eq!(day_of_year(date(2026, 6, 21)), 172);
        assert_eq!(day_of_year(date(2024, 6, 21)), 172);
    }

    #[test]
    fn test_day_of_year_year_ends() {
        // The approximation is one short at the start of the year
        assert_eq!(day_of_year(date(2026, 1, 1)), 0);
        assert_eq!(day_of_year(date(2026, 12, 31)), 365);
    }

    #[test]
    fn test_day_of_year_around_leap_february() {
        assert_eq!(day_of_year(date(2024, 2, 15)), 46);
        assert_eq!(day_of_year(date(2024, 3, 1)), 60);
        assert_eq!(day_of_year(date(2026, 3, 1)), 59);
    }

    #[test]
    fn test_solar_declination_at_solstice() {
        // Close to the 23.44° maximum in late June
        let declination = solar_declination(172);
        assert!((declination - 0.409).abs() < 1e-6);
    }

    #[test]
    fn test_sunset_hour_angle_at_equator() {
        let sunset = sunset_hour_angle(0.0, solar_declination(172));
        assert!((sunset - PI / 2.).abs() < 1e-12);
    }

    #[test]
    fn test_sunset_hour_angle_polar_day_is_finite() {
        let lat = 80.0 * PI / 180.;
        assert_eq!(sunset_hour_angle(lat, solar_declination(172)), PI);
        assert_eq!(sunset_hour_angle(-lat, solar_declination(172)), 0.);
    }

    #[test]
    fn test_inverse_relative_distance_bounds() {
        for j in 0..=365 {
            let dr = inverse_relative_distance(j);
            assert!((0.966..=1.034).contains(&dr), "dr out of range for J={j}");
        }
    }

    #[test]
    fn test_extraterrestrial_radiation_fao_example() {
        // FAO-56 Example 8: 20°S on 3 September (J = 246), Ra = 32.2 MJ m^-2 day^-1
        let lat = -20.0 * PI / 180.;
        let declination = solar_declination(246);
        let sunset = sunset_hour_angle(lat, declination);
        let dr = inverse_relative_distance(246);
        let ra = extraterrestrial_radiation(lat, declination, sunset, dr);
        assert!((ra - 32.2).abs() < 0.1, "Ra = {ra}");
    }

    #[test]
    fn test_clear_sky_radiation_at_sea_level() {
        assert_eq!(clear_sky_radiation(40.0, 0.0), 30.0);
    }
}
