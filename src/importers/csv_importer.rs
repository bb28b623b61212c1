use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::eto::Sample;
use crate::importers::schema::{build_sample, ColumnMap, ImportError};
use crate::utils::{parse_number, parse_timestamp};

/// Parser for the station's CSV export (one row per 5-minute sample)
///
/// # Expected layout:
/// ```text
/// timestamp,Wind Speed,Temperature,Humidity,Pressure Air,Radiant (W),Radiant (kJ)
/// 2025-10-14 07:00:00,1.8,24.6,71,100.9,12.5,3.75
/// ```
/// Column order does not matter and extra columns are ignored.
pub struct CsvImporter {
    path: PathBuf,
}

impl CsvImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate every sample of the file, sorted by timestamp
    pub fn parse(&self) -> Result<Vec<Sample>, ImportError> {
        info!("Parsing CSV samples from {}", self.path.display());
        let file = File::open(&self.path)?;
        Self::parse_reader(file)
    }

    /// Parse CSV content from any reader
    ///
    /// Blank rows are skipped. The first malformed row aborts the import
    /// with its 1-based line number.
    pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<Sample>, ImportError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns = ColumnMap::from_headers(headers.iter())?;
        debug!("Resolved CSV columns: {:?}", columns);

        let mut samples = Vec::new();
        let mut skipped_blank = 0;

        for (idx, result) in reader.records().enumerate() {
            // records() starts after the header line
            let line = idx + 2;
            let record = result?;

            if record.iter().all(|field| field.is_empty()) {
                skipped_blank += 1;
                continue;
            }

            samples.push(Self::parse_record(&record, &columns, line)?);
        }

        if skipped_blank > 0 {
            debug!("Skipped {} blank rows", skipped_blank);
        }

        samples.sort_by_key(|s| s.timestamp);
        info!("Parsed {} samples from CSV", samples.len());
        Ok(samples)
    }

    fn parse_record(
        record: &StringRecord,
        columns: &ColumnMap,
        line: usize,
    ) -> Result<Sample, ImportError> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let timestamp = parse_timestamp(cell(columns.timestamp));
        let values = columns.numeric.map(|idx| parse_number(cell(idx)));

        Ok(build_sample(line, timestamp, values)?)
    }
}
