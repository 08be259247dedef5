use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChartError {
    #[error("Chart must be at least {min_width}x{min_height}, got {width}x{height}")]
    InvalidSize {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },

    #[error("Nothing to plot: {0}")]
    Empty(String),

    #[error("Overlay has {overlay} points but the series has {series}")]
    LengthMismatch { series: usize, overlay: usize },
}
