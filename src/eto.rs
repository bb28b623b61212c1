// ETo (reference evapotranspiration) core
//
// Pure, stateless computation of daily FAO-56 Penman-Monteith ETo from
// sub-daily station samples:
// - windower: slices a sample table into 07:00-to-07:00 agronomic days
// - estimator: turns one day's window into a DailyResult
// - solar/vapor: the astronomical and thermodynamic sub-calculations

pub mod error;
pub mod estimator;
pub mod sample;
pub mod solar;
pub mod vapor;
pub mod windower;

pub use error::EtoError;
pub use estimator::{estimate, estimate_days, DailyAggregates, DailyResult, Intermediates};
pub use sample::{Sample, SiteConstants};
pub use windower::{
    agronomic_date, daily_windows, window_bounds, window_for_day, windows_by_day, DayWindow,
};
