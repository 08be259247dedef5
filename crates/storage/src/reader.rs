use crate::columns::Column;
use crate::error::StorageError;
use crate::quality::DataQuality;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::{PriceField, PriceRecord, PriceTable};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A validated table together with the report on what was missing from it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: PriceTable,
    pub quality: DataQuality,
}

/// Opens `path` and parses it as a daily price CSV.
pub fn load_csv(path: &Path, symbol: &str) -> Result<LoadedTable, StorageError> {
    tracing::info!("Loading price history from {}", path.display());
    let file = File::open(path)?;
    read_prices(file, symbol)
}

/// Parses a daily price CSV from any reader.
///
/// Headers are cleaned (see [`crate::clean_header`]); the date column is required and at
/// least one value column must be recognised. Unknown columns are skipped and listed in the
/// quality report.
pub fn read_prices<R: Read>(reader: R, symbol: &str) -> Result<LoadedTable, StorageError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let joined = headers.iter().collect::<Vec<_>>().join(", ");

    let mut date_index = None;
    let mut fields: Vec<(usize, PriceField)> = Vec::new();
    let mut unknown = Vec::new();

    for (index, raw) in headers.iter().enumerate() {
        match Column::resolve(raw) {
            Column::Date => {
                if let Some(first) = date_index {
                    return Err(StorageError::DuplicateColumn {
                        column: Column::Date.to_string(),
                        first: headers[first].to_string(),
                        second: raw.to_string(),
                    });
                }
                date_index = Some(index);
            }
            Column::Field(field) => {
                if let Some(&(first, _)) = fields.iter().find(|(_, f)| *f == field) {
                    return Err(StorageError::DuplicateColumn {
                        column: field.to_string(),
                        first: headers[first].to_string(),
                        second: raw.to_string(),
                    });
                }
                fields.push((index, field));
            }
            Column::Unknown(name) => {
                tracing::debug!("Ignoring unrecognised column '{}'", raw);
                unknown.push(name);
            }
        }
    }

    let date_index = date_index.ok_or_else(|| StorageError::MissingDateColumn(joined.clone()))?;
    if fields.is_empty() {
        return Err(StorageError::NoPriceColumns(joined));
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let raw_date = row.get(date_index).unwrap_or_default();
        let date = parse_trading_date(raw_date).ok_or_else(|| StorageError::InvalidDate {
            line,
            value: raw_date.to_string(),
        })?;

        let mut record = PriceRecord::empty(date);
        for &(index, field) in &fields {
            let raw = row.get(index).unwrap_or_default();
            let value = parse_decimal(raw).map_err(|_| StorageError::InvalidNumber {
                line,
                column: field.to_string(),
                value: raw.to_string(),
            })?;
            record.set(field, value);
        }
        records.push(record);
    }

    let table = PriceTable::new(symbol, records)?;
    let present: Vec<PriceField> = fields.iter().map(|(_, f)| *f).collect();
    let quality = DataQuality::assess(&table, &present, unknown);

    tracing::info!(
        "Loaded {} rows for {} ({} to {})",
        quality.rows,
        symbol,
        quality.first_date,
        quality.last_date
    );
    for column in quality.columns.iter().filter(|c| c.present && c.missing > 0) {
        tracing::warn!("Column '{}' has {} missing values", column.field, column.missing);
    }
    if quality.missing_days > 0 {
        tracing::warn!(
            "{} calendar days have no row ({} gaps)",
            quality.missing_days,
            quality.gaps.len()
        );
    }

    Ok(LoadedTable { table, quality })
}

/// Parses the timestamp formats found in price exports into the UTC trading date.
///
/// Accepted: `2024-01-31`, RFC 3339, `2024-01-31 00:00:00(.fff)`, `2024-01-31T00:00:00(.fff)`,
/// and unix epochs in seconds or milliseconds.
pub fn parse_trading_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc().date());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    if let Ok(epoch) = raw.parse::<i64>() {
        // Anything past 1973 in milliseconds is larger than any plausible value in seconds.
        let dt = if epoch.abs() > 100_000_000_000 {
            DateTime::from_timestamp_millis(epoch)
        } else {
            DateTime::from_timestamp(epoch, 0)
        };
        return dt.map(|dt| dt.date_naive());
    }

    None
}

/// Parses a numeric cell. Placeholders for "no value" yield `Ok(None)`.
pub fn parse_decimal(raw: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let raw = raw.trim();
    if raw.is_empty()
        || raw == "-"
        || ["na", "n/a", "nan", "null", "none"]
            .iter()
            .any(|p| raw.eq_ignore_ascii_case(p))
    {
        return Ok(None);
    }

    let cleaned: String = raw
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    match Decimal::from_str(&cleaned) {
        Ok(value) => Ok(Some(value)),
        Err(_) => Decimal::from_scientific(&cleaned).map(Some),
    }
}
