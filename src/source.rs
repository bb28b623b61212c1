use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

use crate::eto::Sample;
use crate::fetch_error::FetchError;
use crate::fetcher::SampleFetcher;
use crate::importers::{CsvImporter, ExcelImporter, ImportError};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Where the station's sample table comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SampleSource {
    /// CSV export served over HTTP
    Url(String),
    CsvFile(PathBuf),
    Workbook { path: PathBuf, sheet: Option<String> },
}

/// Identity of a sample source, used as the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SampleSource {
    /// Pick the file importer from the extension (`.xlsx`/`.xlsm` -> workbook,
    /// anything else -> CSV)
    pub fn from_path(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        let path = path.into();
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"))
            .unwrap_or(false);

        if is_workbook {
            SampleSource::Workbook { path, sheet }
        } else {
            SampleSource::CsvFile(path)
        }
    }

    pub fn id(&self) -> SourceId {
        let id = match self {
            SampleSource::Url(url) => format!("url:{url}"),
            SampleSource::CsvFile(path) => format!("csv:{}", path.display()),
            SampleSource::Workbook { path, sheet } => match sheet {
                Some(sheet) => format!("xlsx:{}#{sheet}", path.display()),
                None => format!("xlsx:{}", path.display()),
            },
        };
        SourceId(id)
    }

    /// Load and validate the full sample table
    ///
    /// File parsing runs on the blocking pool.
    #[instrument(skip(self), fields(source = %self.id()))]
    pub async fn load(&self, max_retries: usize) -> Result<Vec<Sample>, LoadError> {
        let samples = match self {
            SampleSource::Url(url) => {
                SampleFetcher::new(url.clone())
                    .with_max_retries(max_retries)
                    .fetch_samples()
                    .await?
            }
            SampleSource::CsvFile(path) => {
                let importer = CsvImporter::new(path.clone());
                tokio::task::spawn_blocking(move || importer.parse()).await??
            }
            SampleSource::Workbook { path, sheet } => {
                let mut importer = ExcelImporter::new(path.to_string_lossy().into_owned());
                if let Some(sheet) = sheet {
                    importer = importer.with_sheet(sheet.clone());
                }
                tokio::task::spawn_blocking(move || importer.parse()).await??
            }
        };

        info!("Loaded {} samples", samples.len());
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_picks_importer() {
        assert_eq!(
            SampleSource::from_path("data/station.XLSX", None),
            SampleSource::Workbook {
                path: PathBuf::from("data/station.XLSX"),
                sheet: None
            }
        );
        assert_eq!(
            SampleSource::from_path("data/station.csv", Some("ignored".to_string())),
            SampleSource::CsvFile(PathBuf::from("data/station.csv"))
        );
    }

    #[test]
    fn test_source_ids_are_distinct() {
        let url = SampleSource::Url("https://example.com/export?format=csv".to_string());
        let sheet_a = SampleSource::Workbook {
            path: PathBuf::from("a.xlsx"),
            sheet: Some("June".to_string()),
        };
        let sheet_b = SampleSource::Workbook {
            path: PathBuf::from("a.xlsx"),
            sheet: Some("July".to_string()),
        };
        assert_eq!(url.id().as_str(), "url:https://example.com/export?format=csv");
        assert_eq!(sheet_a.id().to_string(), "xlsx:a.xlsx#June");
        assert_ne!(sheet_a.id(), sheet_b.id());
    }
}
