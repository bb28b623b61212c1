use csv::Writer;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

use crate::eto::DailyResult;

/// Header row of the daily table export
pub const DAILY_CSV_HEADERS: [&str; 7] = [
    "Date",
    "ETo (mm/day)",
    "Temperature (°C)",
    "Humidity (%)",
    "Wind Speed (m/s)",
    "Pressure Air (kPa)",
    "Radiant (MJ/m²)",
];

/// File name offered to browsers for the export
pub const DAILY_CSV_FILE_NAME: &str = "ETo_Daily_Results.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the daily table as UTF-8 CSV with a leading BOM
///
/// One row per result in the given order. Values are written with full
/// precision.
pub fn write_daily_csv<W: Write>(mut out: W, results: &[DailyResult]) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM)?;

    let mut writer = Writer::from_writer(out);
    writer.write_record(DAILY_CSV_HEADERS)?;

    for result in results {
        writer.write_record([
            result.date.format("%Y-%m-%d").to_string(),
            result.eto_mm.to_string(),
            result.t_mean.to_string(),
            result.rh_mean.to_string(),
            result.u2_mean.to_string(),
            result.p_mean.to_string(),
            result.rn_total.to_string(),
        ])?;
    }

    writer.flush()?;
    debug!("Exported {} daily rows", results.len());
    Ok(())
}

/// Convenience wrapper returning the CSV as bytes
pub fn daily_csv_bytes(results: &[DailyResult]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_daily_csv(&mut buf, results)?;
    Ok(buf)
}
