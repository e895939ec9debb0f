use polars::prelude::PolarsError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    /// A remote or file-backed dataset could not be retrieved.
    #[error("failed to fetch {dataset}: {reason}")]
    FetchFailure { dataset: String, reason: String },
    /// None of the three filter modes is fully specified.
    #[error(
        "select either a faculty, a room, or a complete course + batch + semester combination"
    )]
    IncompleteSelection,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("export failed: {0}")]
    Export(String),
}

impl TimetableError {
    pub fn fetch_failure(dataset: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailure {
            dataset: dataset.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for TimetableError {
    fn from(value: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        Self::Io(value.into_error())
    }
}

pub type TimetableResult<T> = Result<T, TimetableError>;
