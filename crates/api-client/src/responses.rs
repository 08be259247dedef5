use serde::Deserialize;

// Binance encodes each kline as a positional JSON array:
// [open time, open, high, low, close, volume, close time, quote volume, trades,
//  taker buy base volume, taker buy quote volume, ignore]

/// Intermediate struct for deserializing klines from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub i64,
    pub String,
    pub String,
    pub String,
);

/// Represents an error response from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
