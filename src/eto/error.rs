use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EtoError {
    #[error("No samples in the agronomic day window for {date}")]
    EmptyWindow { date: NaiveDate },
    #[error("ETo for {date} is not computable: {term} is {value}")]
    NonFinite {
        date: NaiveDate,
        term: String,
        value: f64,
    },
    #[error("Invalid sample at row {row}, field '{field}': {reason}")]
    InvalidSample {
        row: usize,
        field: String,
        reason: String,
    },
}

impl EtoError {
    pub fn invalid_sample(row: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        EtoError::InvalidSample {
            row,
            field: field.into(),
            reason: reason.into(),
        }
    }
}
