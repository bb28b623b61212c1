use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::cache::SampleCache;
use crate::eto::{estimate, window_for_day, windows_by_day, DailyResult, DayWindow, EtoError};
use crate::eto::{Sample, SiteConstants};
use crate::export::{daily_csv_bytes, ExportError};
use crate::source::{LoadError, SampleSource};

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No samples for {0}")]
    NoData(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Estimate(#[from] EtoError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Estimation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Optional inclusive bounds on the agronomic dates to report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(ServiceError::InvalidRange { start, end })
            }
            _ => Ok(()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{start} to {end}"),
            (Some(start), None) => write!(f, "dates from {start}"),
            (None, Some(end)) => write!(f, "dates up to {end}"),
            (None, None) => write!(f, "any date"),
        }
    }
}

/// One day's result with the window it was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub window_start: NaiveDateTime,
    /// Exclusive
    pub window_end: NaiveDateTime,
    pub sample_count: usize,
    pub result: DailyResult,
}

/// Non-empty windows of the agronomic days in `range`, ascending by date
///
/// Days without samples are logged and skipped. Fails with `NoData` when no
/// day in the range has samples.
pub fn select_windows(samples: &[Sample], range: DateRange) -> Result<Vec<DayWindow>, ServiceError> {
    range.validate()?;

    let mut windows = Vec::new();
    for (date, window) in windows_by_day(samples) {
        if !range.contains(date) {
            continue;
        }
        match window {
            Some(window) => windows.push(window),
            None => warn!("No samples for {}, skipping", date),
        }
    }

    if windows.is_empty() {
        return Err(ServiceError::NoData(range.to_string()));
    }
    Ok(windows)
}

/// Estimate every window on the blocking pool, at most `concurrency` at a time
///
/// `on_done` is called once per finished day in completion order. Days whose
/// estimate is not computable are left out. The returned table is sorted by
/// date.
pub async fn estimate_windows<F>(
    windows: Vec<DayWindow>,
    site: SiteConstants,
    concurrency: usize,
    mut on_done: F,
) -> Result<Vec<DailyResult>, ServiceError>
where
    F: FnMut(&DailyResult),
{
    let mut pending = stream::iter(windows)
        .map(|window| tokio::task::spawn_blocking(move || estimate(&window, &site)))
        .buffer_unordered(concurrency.max(1));

    let mut results = Vec::new();
    while let Some(joined) = pending.next().await {
        match joined? {
            Ok(result) => {
                on_done(&result);
                results.push(result);
            }
            Err(e) => warn!("Skipping day: {}", e),
        }
    }

    results.sort_by_key(|r| r.date);
    Ok(results)
}

/// Daily ETo over one station's sample table
#[derive(Clone)]
pub struct EtoService {
    source: SampleSource,
    site: SiteConstants,
    cache: SampleCache,
    concurrency: usize,
    max_retries: usize,
}

impl EtoService {
    pub fn new(source: SampleSource, site: SiteConstants, cache: SampleCache) -> Self {
        Self {
            source,
            site,
            cache,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: 3,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn source(&self) -> &SampleSource {
        &self.source
    }

    pub fn site(&self) -> &SiteConstants {
        &self.site
    }

    /// Sample table of the configured source, loaded on first use
    pub async fn samples(&self) -> Result<Arc<Vec<Sample>>, ServiceError> {
        let samples = self
            .cache
            .get_or_load(&self.source.id(), || self.source.load(self.max_retries))
            .await?;
        Ok(samples)
    }

    /// Load the table again and replace the cached one; returns the new
    /// sample count
    ///
    /// On failure the cached table is kept.
    #[instrument(skip(self), fields(source = %self.source.id()))]
    pub async fn refresh(&self) -> Result<usize, ServiceError> {
        let samples = self.source.load(self.max_retries).await?;
        let samples = self.cache.insert(self.source.id(), samples).await;
        info!("Refreshed sample table: {} samples", samples.len());
        Ok(samples.len())
    }

    /// Daily table over `range`, ascending by date
    ///
    /// Days without samples or without a computable estimate are skipped.
    /// Fails with `NoData` when no day in the range is left.
    #[instrument(skip(self), fields(range = %range))]
    pub async fn daily_results(&self, range: DateRange) -> Result<Vec<DailyResult>, ServiceError> {
        range.validate()?;
        let samples = self.samples().await?;
        let windows = select_windows(&samples, range)?;

        debug!("Estimating {} days", windows.len());
        let results = estimate_windows(windows, self.site, self.concurrency, |_| {}).await?;
        if results.is_empty() {
            return Err(ServiceError::NoData(range.to_string()));
        }
        info!("Computed ETo for {} days", results.len());
        Ok(results)
    }

    /// Result, window bounds and sample count for one day
    #[instrument(skip(self))]
    pub async fn day_detail(&self, date: NaiveDate) -> Result<DayDetail, ServiceError> {
        let window = self.window(date).await?;
        let result = estimate(&window, &self.site)?;

        Ok(DayDetail {
            date,
            window_start: window.start,
            window_end: window.end,
            sample_count: window.len(),
            result,
        })
    }

    /// Raw samples of one day's window, ordered by timestamp
    #[instrument(skip(self))]
    pub async fn day_samples(&self, date: NaiveDate) -> Result<Vec<Sample>, ServiceError> {
        Ok(self.window(date).await?.samples)
    }

    /// Daily table over `range` as CSV bytes
    pub async fn export_csv(&self, range: DateRange) -> Result<Vec<u8>, ServiceError> {
        let results = self.daily_results(range).await?;
        Ok(daily_csv_bytes(&results)?)
    }

    async fn window(&self, date: NaiveDate) -> Result<DayWindow, ServiceError> {
        let samples = self.samples().await?;
        window_for_day(&samples, date).ok_or_else(|| {
            warn!("No samples for {}", date);
            ServiceError::NoData(date.to_string())
        })
    }
}
