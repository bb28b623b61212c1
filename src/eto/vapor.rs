//! Vapor pressure and psychrometric terms (FAO-56, chapter 3)

/// Saturation vapor pressure at air temperature `t` (°C), in kPa
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    0.6108 * (17.27 * t / (t + 237.3)).exp()
}

/// Slope of the saturation vapor pressure curve at `t_mean` (kPa/°C)
pub fn saturation_slope(t_mean: f64) -> f64 {
    2504. * (17.27 * t_mean / (t_mean + 237.3)).exp() / (t_mean + 237.3).powf(2.)
}

/// Actual vapor pressure from the daily humidity extremes (kPa)
///
/// Pairs the saturation pressure at the minimum temperature with the
/// maximum humidity and vice versa.
pub fn actual_vapor_pressure(es_min: f64, es_max: f64, rh_max: f64, rh_min: f64) -> f64 {
    (es_min * (rh_max / 100.) + es_max * (rh_min / 100.)) / 2.
}

/// Psychrometric constant from mean air pressure in kPa (kPa/°C)
pub fn psychrometric_constant(p_mean: f64) -> f64 {
    0.000665 * p_mean
}
