use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::eto::sample::Sample;

/// Hour of day (local time) at which an agronomic day begins
pub const DAY_START_HOUR: u32 = 7;

/// All samples attributed to one agronomic day
///
/// Day D covers `[D-1 07:00, D 07:00)`. Samples are ordered by timestamp and
/// the window is never empty when produced by this module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    /// Exclusive upper bound
    pub end: NaiveDateTime,
    pub samples: Vec<Sample>,
}

impl DayWindow {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

/// Boundary instants of day `date`: `[date-1 07:00, date 07:00)`
///
/// `None` when the window falls outside chrono's representable range.
pub fn window_bounds(date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let end = date.and_hms_opt(DAY_START_HOUR, 0, 0)?;
    let start = end.checked_sub_days(Days::new(1))?;
    Some((start, end))
}

/// The agronomic day a timestamp belongs to, `None` past the last representable date
pub fn agronomic_date(timestamp: NaiveDateTime) -> Option<NaiveDate> {
    timestamp
        .checked_sub_signed(Duration::hours(DAY_START_HOUR.into()))?
        .date()
        .succ_opt()
}

/// Select the samples of a single day, `None` if there are none
pub fn window_for_day(samples: &[Sample], date: NaiveDate) -> Option<DayWindow> {
    let (start, end) = window_bounds(date)?;

    let mut selected: Vec<Sample> = samples
        .iter()
        .filter(|s| start <= s.timestamp && s.timestamp < end)
        .cloned()
        .collect();

    if selected.is_empty() {
        debug!("No samples between {} and {}", start, end);
        return None;
    }

    selected.sort_by_key(|s| s.timestamp);
    Some(DayWindow {
        date,
        start,
        end,
        samples: selected,
    })
}

/// Window every date from the day after the first sample's calendar date up
/// to the last sample's calendar date, inclusive
///
/// Dates without samples are kept with `None` so callers can see the gap.
/// Samples before the first date's window or after the last date's window
/// are not attributed to any day.
pub fn windows_by_day(samples: &[Sample]) -> Vec<(NaiveDate, Option<DayWindow>)> {
    let (Some(first_ts), Some(last_ts)) = (
        samples.iter().map(|s| s.timestamp).min(),
        samples.iter().map(|s| s.timestamp).max(),
    ) else {
        return Vec::new();
    };

    let Some(first_date) = first_ts.date().succ_opt() else {
        return Vec::new();
    };
    let last_date = last_ts.date();

    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.timestamp);

    let mut by_day: BTreeMap<NaiveDate, Vec<Sample>> = BTreeMap::new();
    for sample in sorted {
        if let Some(date) = agronomic_date(sample.timestamp) {
            by_day.entry(date).or_default().push(sample);
        }
    }

    let windows: Vec<(NaiveDate, Option<DayWindow>)> = first_date
        .iter_days()
        .take_while(|date| *date <= last_date)
        .map(|date| {
            let window = by_day.remove(&date).and_then(|samples| {
                let (start, end) = window_bounds(date)?;
                Some(DayWindow {
                    date,
                    start,
                    end,
                    samples,
                })
            });
            (date, window)
        })
        .collect();

    debug!(
        "Windowed {} samples into {} days ({} with data)",
        samples.len(),
        windows.len(),
        windows.iter().filter(|(_, w)| w.is_some()).count()
    );

    windows
}

/// Non-empty windows only, ascending by date
pub fn daily_windows(samples: &[Sample]) -> Vec<DayWindow> {
    windows_by_day(samples)
        .into_iter()
        .filter_map(|(_, window)| window)
        .collect()
}
