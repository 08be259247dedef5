use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("More than one row for trading day {0}")]
    DuplicateDate(NaiveDate),

    #[error("Price table for {0} has no rows")]
    EmptyTable(String),

    #[error("Column '{field}' has no value on {date}")]
    MissingValue { field: String, date: NaiveDate },

    #[error("Column '{0}' contains no observations")]
    EmptyColumn(String),

    #[error("Series '{name}' has {dates} dates but {values} values")]
    LengthMismatch {
        name: String,
        dates: usize,
        values: usize,
    },
}
