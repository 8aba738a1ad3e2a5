use thiserror::Error;

/// Failures at the ingestion/calculation boundary.
///
/// None of these abort the tool: the dashboard renders them as a warning and
/// waits for the next upload.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AnalysisError {
    #[error("unreadable input: {0}")]
    Format(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("empty input: {0}")]
    EmptyInput(String),
}

impl AnalysisError {
    pub fn format(msg: impl Into<String>) -> Self {
        AnalysisError::Format(msg.into())
    }

    pub fn empty(msg: impl Into<String>) -> Self {
        AnalysisError::EmptyInput(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Format(_) => "FormatError",
            AnalysisError::ColumnNotFound(_) => "ColumnNotFoundError",
            AnalysisError::EmptyInput(_) => "EmptyInputError",
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
