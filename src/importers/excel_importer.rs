use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fs::File;
use std::io::BufReader;
use tracing::{debug, info, warn};

use crate::eto::Sample;
use crate::importers::schema::{build_sample, ColumnMap, ImportError};
use crate::utils::{parse_number, parse_timestamp};

/// Parser for station data kept in an Excel workbook
///
/// # Expected Sheet Structure:
/// ```text
/// Row 1: Header (timestamp | Wind Speed | Temperature | Humidity | Pressure Air | Radiant (W) | Radiant (kJ))
/// Row 2+: One sample per row
/// ```
/// Timestamps may be native Excel datetimes, date serial numbers or text.
pub struct ExcelImporter {
    workbook_path: String,
    sheet_name: Option<String>,
}

impl ExcelImporter {
    /// Read from the first sheet of the workbook
    pub fn new(workbook_path: impl Into<String>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
            sheet_name: None,
        }
    }

    pub fn with_sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    /// Parse every sample of the selected sheet, sorted by timestamp
    ///
    /// This is synchronous, async callers should use spawn_blocking.
    pub fn parse(&self) -> Result<Vec<Sample>, ImportError> {
        let mut workbook: Xlsx<BufReader<File>> = match open_workbook(&self.workbook_path) {
            Ok(wb) => wb,
            Err(e) => return Err(ImportError::WorkbookOpen(e.to_string())),
        };

        let sheet_name = match &self.sheet_name {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound("<first sheet>".to_string()))?,
        };
        info!("Parsing sheet {} of {}", sheet_name, self.workbook_path);

        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(_) => return Err(ImportError::SheetNotFound(sheet_name)),
        };

        Self::parse_range(&range)
    }

    /// Parse samples from an already loaded sheet range
    ///
    /// The first row of the range is the header row. Row numbers in errors
    /// are 1-based sheet rows.
    pub fn parse_range(range: &Range<Data>) -> Result<Vec<Sample>, ImportError> {
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows = range.rows();

        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| ImportError::MissingColumns(vec!["timestamp".to_string()]))?
            .iter()
            .map(|cell| match cell {
                Data::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let columns = ColumnMap::from_headers(&header)?;
        debug!("Resolved sheet columns: {:?}", columns);

        let mut samples = Vec::new();
        for (idx, row) in rows.enumerate() {
            // +2: header is the first row, sheet rows are 1-based
            let sheet_row = first_row + idx + 2;

            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }

            let cell = |col: usize| row.get(col).unwrap_or(&Data::Empty);
            let timestamp = Self::parse_timestamp_cell(cell(columns.timestamp));
            let values = columns.numeric.map(|col| Self::parse_number_cell(cell(col)));

            samples.push(build_sample(sheet_row, timestamp, values)?);
        }

        samples.sort_by_key(|s| s.timestamp);
        info!("Parsed {} samples from sheet", samples.len());
        Ok(samples)
    }

    fn parse_timestamp_cell(cell: &Data) -> Option<NaiveDateTime> {
        match cell {
            Data::DateTime(excel_date) => excel_date.as_datetime(),
            Data::DateTimeIso(s) | Data::String(s) => parse_timestamp(s),
            Data::Float(f) => Self::from_excel_serial(*f),
            Data::Int(i) => Self::from_excel_serial(*i as f64),
            Data::Empty => None,
            other => {
                warn!("Unexpected timestamp cell: {:?}", other);
                None
            }
        }
    }

    fn parse_number_cell(cell: &Data) -> Option<f64> {
        match cell {
            Data::Float(f) => Some(*f),
            Data::Int(i) => Some(*i as f64),
            Data::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Excel serial day number (fractional part is the time of day)
    fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() {
            return None;
        }
        let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
        let seconds = (serial * 86_400.0).round() as i64;
        base.checked_add_signed(Duration::seconds(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_range(rows: u32) -> Range<Data> {
        let mut range = Range::new((0, 0), (rows, 5));
        let headers = [
            "timestamp",
            "Temperature",
            "Humidity",
            "Wind Speed",
            "Pressure Air",
            "Radiant (kJ)",
        ];
        for (col, name) in headers.iter().enumerate() {
            range.set_value((0, col as u32), Data::String(name.to_string()));
        }
        range
    }

    fn fill_row(range: &mut Range<Data>, row: u32, timestamp: Data, values: [f64; 5]) {
        range.set_value((row, 0), timestamp);
        for (offset, value) in values.iter().enumerate() {
            range.set_value((row, offset as u32 + 1), Data::Float(*value));
        }
    }

    #[test]
    fn test_excel_importer_creation() {
        let importer = ExcelImporter::new("test.xlsx").with_sheet("Data");
        assert_eq!(importer.workbook_path, "test.xlsx");
        assert_eq!(importer.sheet_name.as_deref(), Some("Data"));
    }

    #[test]
    fn test_parse_range_text_and_serial_timestamps() {
        let mut range = header_range(2);
        fill_row(
            &mut range,
            1,
            Data::String("2025-10-14 07:05:00".to_string()),
            [24.6, 71.0, 1.8, 100.9, 3.75],
        );
        // 2025-10-14 07:00:00 as an Excel serial
        fill_row(
            &mut range,
            2,
            Data::Float(45944.0 + 7.0 / 24.0),
            [24.1, 73.0, 1.6, 100.9, 3.0],
        );

        let samples = ExcelImporter::parse_range(&range).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0].timestamp,
            NaiveDate::from_ymd_opt(2025, 10, 14)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap()
        );
        assert_eq!(samples[0].temperature_c, 24.1);
        assert_eq!(samples[1].radiation_kj, 3.75);
    }

    #[test]
    fn test_parse_range_skips_empty_rows() {
        let mut range = header_range(3);
        fill_row(
            &mut range,
            1,
            Data::String("2025-10-14 07:05:00".to_string()),
            [24.6, 71.0, 1.8, 100.9, 3.75],
        );
        let samples = ExcelImporter::parse_range(&range).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_parse_range_invalid_cell_reports_sheet_row() {
        let mut range = header_range(1);
        fill_row(
            &mut range,
            1,
            Data::String("2025-10-14 07:05:00".to_string()),
            [24.6, 71.0, 1.8, 100.9, 3.75],
        );
        range.set_value((1, 2), Data::String("--".to_string()));

        match ExcelImporter::parse_range(&range) {
            Err(ImportError::InvalidSample(crate::eto::EtoError::InvalidSample {
                row, field, ..
            })) => {
                assert_eq!(row, 2);
                assert_eq!(field, "Humidity");
            }
            other => panic!("Expected InvalidSample, got {other:?}"),
        }
    }

    #[test]
    fn test_workbook_not_found() {
        let importer = ExcelImporter::new("/nonexistent/path/to/file.xlsx");
        assert!(matches!(
            importer.parse(),
            Err(ImportError::WorkbookOpen(_))
        ));
    }

    #[test]
    fn test_from_excel_serial() {
        let ts = ExcelImporter::from_excel_serial(45944.5).unwrap();
        assert_eq!(ts.to_string(), "2025-10-14 12:00:00");
    }
}
