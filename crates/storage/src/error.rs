use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("No date column found; expected one of timestamp, date, time (headers: {0})")]
    MissingDateColumn(String),

    #[error("No price columns found (headers: {0})")]
    NoPriceColumns(String),

    #[error("Columns '{first}' and '{second}' both map to '{column}'")]
    DuplicateColumn {
        column: String,
        first: String,
        second: String,
    },

    #[error("Line {line}: cannot parse '{value}' as a date")]
    InvalidDate { line: u64, value: String },

    #[error("Line {line}: cannot parse '{value}' in column '{column}' as a number")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Trading day {0} appears more than once")]
    DuplicateDate(NaiveDate),

    #[error("Invalid price table: {0}")]
    Table(CoreError),
}

impl From<CoreError> for StorageError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::DuplicateDate(date) => StorageError::DuplicateDate(date),
            other => StorageError::Table(other),
        }
    }
}
