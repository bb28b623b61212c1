use chrono::NaiveDateTime;
use thiserror::Error;

use crate::eto::{EtoError, Sample};
use crate::utils::normalize_header;

/// Column headers of the station export, in the order fields are read
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "timestamp",
    "Temperature",
    "Humidity",
    "Wind Speed",
    "Pressure Air",
    "Radiant (kJ)",
];

/// Names of the five numeric fields, matching `REQUIRED_COLUMNS[1..]`
const NUMERIC_FIELDS: [&str; 5] = [
    "Temperature",
    "Humidity",
    "Wind Speed",
    "Pressure Air",
    "Radiant (kJ)",
];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    InvalidSample(#[from] EtoError),
}

/// Positions of the required columns in a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub timestamp: usize,
    /// Temperature, humidity, wind speed, pressure, radiation
    pub numeric: [usize; 5],
}

impl ColumnMap {
    /// Locate every required column, ignoring case, surrounding whitespace
    /// and a leading BOM. Extra columns are allowed.
    pub fn from_headers<I, S>(headers: I) -> Result<Self, ImportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();

        let find = |name: &str| {
            let wanted = normalize_header(name);
            normalized.iter().position(|h| *h == wanted)
        };

        let mut positions = [0usize; 6];
        let mut missing = Vec::new();
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match find(name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        let [timestamp, numeric @ ..] = positions;
        Ok(Self { timestamp, numeric })
    }
}

/// Assemble and validate a sample from already-decoded cells
///
/// A `None` cell means the value was blank or not numeric.
pub fn build_sample(
    row: usize,
    timestamp: Option<NaiveDateTime>,
    values: [Option<f64>; 5],
) -> Result<Sample, EtoError> {
    let timestamp = timestamp.ok_or_else(|| {
        EtoError::invalid_sample(row, REQUIRED_COLUMNS[0], "missing or unrecognised timestamp")
    })?;

    let mut fields = [0.0f64; 5];
    for ((slot, value), name) in fields.iter_mut().zip(values).zip(NUMERIC_FIELDS) {
        *slot = value.ok_or_else(|| EtoError::invalid_sample(row, name, "missing or non-numeric value"))?;
    }

    let [temperature_c, humidity_pct, wind_speed_ms, pressure_kpa, radiation_kj] = fields;
    let sample = Sample::new(
        timestamp,
        temperature_c,
        humidity_pct,
        wind_speed_ms,
        pressure_kpa,
        radiation_kj,
    );
    sample.validate(row)?;
    Ok(sample)
}
