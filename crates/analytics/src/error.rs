use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Cannot take the logarithm of {value} at position {index}; values must be positive")]
    NonPositive { index: usize, value: f64 },

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Series '{0}' is constant; its autocorrelation is undefined")]
    ZeroVariance(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),

    #[error("Could not build series: {0}")]
    Series(#[from] CoreError),
}
