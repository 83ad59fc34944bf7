use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("row {row}: field '{field}' {reason}")]
    Validation {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("no records found to generate a report")]
    EmptyResult,

    #[error("render error: {0}")]
    Render(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] csv::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn validation(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            row,
            field,
            reason: reason.into(),
        }
    }
}
