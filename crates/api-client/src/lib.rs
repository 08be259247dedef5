pub use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use configuration::FetchSettings;
use core_types::Kline;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{ApiErrorResponse, RawKline};

/// Maximum number of klines Binance returns for a single request.
pub const MAX_KLINES_PER_REQUEST: u32 = 1000;

/// The generic, abstract interface for a market-data API client.
/// The CLI only talks to this trait, so the exchange behind it can be swapped out
/// (or mocked in tests).
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches public historical kline data.
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<Kline>, ApiError>;

    /// Fetches one kline per trading day.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<Kline>, ApiError> {
        self.fetch_klines(symbol, "1d", start_time, end_time).await
    }
}

/// A concrete implementation of the `ApiClient` for the Binance spot market.
/// Only public endpoints are used, so no API key is required.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(settings: &FetchSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("driftscope/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ApiClient for BinanceClient {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<Kline>, ApiError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        tracing::debug!("GET {} {} {} {} -> {}", url, symbol, interval, start_time, end_time);

        let start = start_time.timestamp_millis().to_string();
        let end = end_time.timestamp_millis().to_string();
        let limit = MAX_KLINES_PER_REQUEST.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("startTime", start.as_str()),
                ("endTime", end.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(parse_error_body(&text, status.as_u16()));
        }

        let raw: Vec<RawKline> =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        let klines = parse_klines(raw, interval)?;

        tracing::debug!("Received {} klines for {}", klines.len(), symbol);
        Ok(klines)
    }
}

/// Converts the exchange's positional kline arrays into typed klines.
pub fn parse_klines(raw: Vec<RawKline>, interval: &str) -> Result<Vec<Kline>, ApiError> {
    raw.into_iter()
        .map(|raw| {
            Ok(Kline {
                open_time: millis_to_utc(raw.0)?,
                open: parse_price(&raw.1)?,
                high: parse_price(&raw.2)?,
                low: parse_price(&raw.3)?,
                close: parse_price(&raw.4)?,
                volume: parse_price(&raw.5)?,
                close_time: millis_to_utc(raw.6)?,
                interval: interval.to_string(),
            })
        })
        .collect()
}

/// Maps a non-2xx body to an error. Binance sends `{"code": -1121, "msg": "..."}`; anything
/// else is reported verbatim with the HTTP status.
pub fn parse_error_body(text: &str, status: u16) -> ApiError {
    match serde_json::from_str::<ApiErrorResponse>(text) {
        Ok(body) => ApiError::Exchange(body.code, body.msg),
        Err(_) => ApiError::Exchange(i64::from(status), text.to_string()),
    }
}

fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>, ApiError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", millis)))
}

fn parse_price(raw: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw).map_err(|e| ApiError::Deserialization(format!("'{}': {}", raw, e)))
}
