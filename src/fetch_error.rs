use crate::importers::ImportError;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Sample source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Failed to parse sample table: {0}")]
    Import(#[from] ImportError),
}

impl FetchError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Import(_) => false,
        }
    }
}
