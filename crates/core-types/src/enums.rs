use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A column of the daily price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    MarketCap,
}

impl PriceField {
    pub const ALL: [PriceField; 6] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
        PriceField::MarketCap,
    ];

    /// The canonical (cleaned) column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
            PriceField::MarketCap => "market_cap",
        }
    }

    /// Whether the column is quoted in USD (as opposed to a traded quantity).
    pub fn is_price(&self) -> bool {
        matches!(
            self,
            PriceField::Open | PriceField::High | PriceField::Low | PriceField::Close
        )
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            "volume" | "vol" => Ok(PriceField::Volume),
            "market_cap" | "marketcap" | "market_capitalization" => Ok(PriceField::MarketCap),
            other => Err(CoreError::InvalidInput(
                "price field".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// A transformation applied to a series before testing it for stationarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// The raw series.
    Level,
    /// Natural logarithm, `ln x_t`.
    Log,
    /// First difference, `x_t - x_{t-1}`.
    Diff,
    /// Log return, `ln x_t - ln x_{t-1}`.
    LogDiff,
}

impl Transform {
    pub const ALL: [Transform; 4] = [
        Transform::Level,
        Transform::Log,
        Transform::Diff,
        Transform::LogDiff,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Transform::Level => "level",
            Transform::Log => "log",
            Transform::Diff => "diff",
            Transform::LogDiff => "log_diff",
        }
    }

    /// Returns true if the transform differences the series, i.e. drops the first observation.
    pub fn is_differenced(&self) -> bool {
        matches!(self, Transform::Diff | Transform::LogDiff)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How gaps in a column are handled when a series is extracted from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Skip the day entirely.
    #[default]
    Drop,
    /// Carry the last observed value forward. Leading gaps are still dropped.
    ForwardFill,
    /// Refuse to build the series.
    Fail,
}
