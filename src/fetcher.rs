use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::eto::Sample;
use crate::fetch_error::FetchError;
use crate::importers::CsvImporter;

/// Downloads the station's sample table from a CSV export URL
/// (e.g. a published spreadsheet with `export?format=csv`)
#[derive(Clone)]
pub struct SampleFetcher {
    client: reqwest::Client,
    url: String,
    max_retries: usize,
}

impl SampleFetcher {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            max_retries: 3,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download and parse the full sample table
    ///
    /// Timeouts, connection failures and 429/5xx responses are retried with
    /// exponential backoff; malformed content is not.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_samples(&self) -> Result<Vec<Sample>, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(10))
            .with_max_times(self.max_retries);

        let body = (|| async { self.download().await })
            .retry(backoff)
            .when(|e: &FetchError| e.is_transient())
            .notify(|e: &FetchError, delay: Duration| {
                warn!("Sample download failed ({}), retrying in {:?}", e, delay);
            })
            .await?;

        debug!("Retrieved CSV content, size: {} bytes", body.len());
        let samples = CsvImporter::parse_reader(body.as_bytes())?;
        info!("Fetched {} samples", samples.len());
        Ok(samples)
    }

    async fn download(&self) -> Result<String, FetchError> {
        debug!("Sending HTTP request to sample source");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(response.text().await?)
    }
}
