use crate::enums::{MissingPolicy, PriceField};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One trading day of market data. Every value column may be missing in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub market_cap: Option<Decimal>,
}

impl PriceRecord {
    /// A record with only the date set.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            market_cap: None,
        }
    }

    pub fn get(&self, field: PriceField) -> Option<Decimal> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
            PriceField::MarketCap => self.market_cap,
        }
    }

    pub fn set(&mut self, field: PriceField, value: Option<Decimal>) {
        let slot = match field {
            PriceField::Open => &mut self.open,
            PriceField::High => &mut self.high,
            PriceField::Low => &mut self.low,
            PriceField::Close => &mut self.close,
            PriceField::Volume => &mut self.volume,
            PriceField::MarketCap => &mut self.market_cap,
        };
        *slot = value;
    }
}

/// The daily price history of a single asset.
///
/// Rows are sorted by date and there is exactly one row per trading day.
/// Both properties are enforced by [`PriceTable::new`], so every other method can rely on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    symbol: String,
    records: Vec<PriceRecord>,
}

impl PriceTable {
    pub fn new(symbol: impl Into<String>, mut records: Vec<PriceRecord>) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if records.is_empty() {
            return Err(CoreError::EmptyTable(symbol));
        }

        if records.windows(2).any(|w| w[0].date > w[1].date) {
            tracing::debug!("Sorting {} rows for {} by date", records.len(), symbol);
            records.sort_by_key(|r| r.date);
        }

        if let Some(w) = records.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(CoreError::DuplicateDate(w[0].date));
        }

        Ok(Self { symbol, records })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// The raw column as floats, `None` where the cell was missing.
    pub fn column(&self, field: PriceField) -> Vec<Option<f64>> {
        self.records
            .iter()
            .map(|r| r.get(field).and_then(|d| d.to_f64()))
            .collect()
    }

    /// Number of missing cells in a column.
    pub fn missing(&self, field: PriceField) -> usize {
        self.records.iter().filter(|r| r.get(field).is_none()).count()
    }

    /// Extracts a dense series for `field`, resolving missing cells with `policy`.
    pub fn series(&self, field: PriceField, policy: MissingPolicy) -> Result<Series, CoreError> {
        let mut dates = Vec::with_capacity(self.records.len());
        let mut values = Vec::with_capacity(self.records.len());
        let mut last: Option<f64> = None;

        for (record, value) in self.records.iter().zip(self.column(field)) {
            match (value, policy) {
                (Some(v), _) => {
                    last = Some(v);
                    dates.push(record.date);
                    values.push(v);
                }
                (None, MissingPolicy::Drop) => {}
                (None, MissingPolicy::ForwardFill) => {
                    if let Some(v) = last {
                        dates.push(record.date);
                        values.push(v);
                    }
                }
                (None, MissingPolicy::Fail) => {
                    return Err(CoreError::MissingValue {
                        field: field.to_string(),
                        date: record.date,
                    });
                }
            }
        }

        if values.is_empty() {
            return Err(CoreError::EmptyColumn(field.to_string()));
        }

        Series::new(field.as_str(), dates, values)
    }

    /// Pairs of consecutive rows that are more than one calendar day apart.
    pub fn calendar_gaps(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.records
            .windows(2)
            .filter(|w| (w[1].date - w[0].date).num_days() > 1)
            .map(|w| (w[0].date, w[1].date))
            .collect()
    }
}

/// A dense, date-aligned sequence of observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(CoreError::LengthMismatch {
                name,
                dates: dates.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// A single candlestick as returned by an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: DateTime<Utc>,
    pub interval: String,
}

impl Kline {
    /// Converts a daily kline into a table row. Exchanges do not report market capitalisation.
    pub fn into_record(self) -> PriceRecord {
        PriceRecord {
            date: self.open_time.date_naive(),
            open: Some(self.open),
            high: Some(self.high),
            low: Some(self.low),
            close: Some(self.close),
            volume: Some(self.volume),
            market_cap: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(d: u32, close: Option<Decimal>) -> PriceRecord {
        PriceRecord {
            close,
            ..PriceRecord::empty(day(d))
        }
    }

    #[test]
    fn table_sorts_rows_by_date() {
        let table = PriceTable::new(
            "BTC",
            vec![record(3, Some(dec!(3))), record(1, Some(dec!(1))), record(2, Some(dec!(2)))],
        )
        .unwrap();
        assert_eq!(table.first_date(), day(1));
        assert_eq!(table.last_date(), day(3));
        assert_eq!(table.column(PriceField::Close), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn table_rejects_duplicate_days() {
        let err = PriceTable::new("BTC", vec![record(2, None), record(1, None), record(2, None)])
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateDate(day(2)));
    }

    #[test]
    fn table_rejects_empty_input() {
        assert_eq!(
            PriceTable::new("ETH", vec![]).unwrap_err(),
            CoreError::EmptyTable("ETH".to_string())
        );
    }

    #[test]
    fn series_applies_missing_policy() {
        let table = PriceTable::new(
            "BTC",
            vec![
                record(1, None),
                record(2, Some(dec!(10))),
                record(3, None),
                record(4, Some(dec!(12))),
            ],
        )
        .unwrap();

        let dropped = table.series(PriceField::Close, MissingPolicy::Drop).unwrap();
        assert_eq!(dropped.values(), &[10.0, 12.0]);
        assert_eq!(dropped.dates(), &[day(2), day(4)]);

        let filled = table.series(PriceField::Close, MissingPolicy::ForwardFill).unwrap();
        assert_eq!(filled.values(), &[10.0, 10.0, 12.0]);
        assert_eq!(filled.dates(), &[day(2), day(3), day(4)]);

        let err = table.series(PriceField::Close, MissingPolicy::Fail).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingValue {
                field: "close".to_string(),
                date: day(1)
            }
        );
        assert_eq!(table.missing(PriceField::Close), 2);
    }

    #[test]
    fn series_of_empty_column_is_an_error() {
        let table = PriceTable::new("BTC", vec![record(1, Some(dec!(1)))]).unwrap();
        assert_eq!(
            table.series(PriceField::MarketCap, MissingPolicy::Drop).unwrap_err(),
            CoreError::EmptyColumn("market_cap".to_string())
        );
    }

    #[test]
    fn detects_calendar_gaps() {
        let table = PriceTable::new(
            "BTC",
            vec![record(1, None), record(2, None), record(5, None), record(6, None), record(8, None)],
        )
        .unwrap();
        assert_eq!(table.calendar_gaps(), vec![(day(2), day(5)), (day(6), day(8))]);
    }

    #[test]
    fn series_requires_aligned_lengths() {
        assert!(Series::new("x", vec![day(1)], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn kline_becomes_a_daily_record_without_market_cap() {
        let open_time = day(7).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let kline = Kline {
            open_time,
            open: dec!(1),
            high: dec!(2),
            low: dec!(0.5),
            close: dec!(1.5),
            volume: dec!(100),
            close_time: open_time + chrono::Duration::days(1) - chrono::Duration::milliseconds(1),
            interval: "1d".to_string(),
        };
        let record = kline.into_record();
        assert_eq!(record.date, day(7));
        assert_eq!(record.close, Some(dec!(1.5)));
        assert_eq!(record.market_cap, None);
    }
}
