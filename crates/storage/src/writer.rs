use crate::error::StorageError;
use chrono::NaiveDate;
use core_types::{PriceField, PriceTable, Series};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes a table with the canonical header `timestamp,open,high,low,close,volume,market_cap`.
/// Missing cells are written as empty fields, so the file reads back into the same table.
pub fn write_prices(path: &Path, table: &PriceTable) -> Result<(), StorageError> {
    create_parent(path)?;
    write_prices_to(File::create(path)?, table)?;
    tracing::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

pub fn write_prices_to<W: Write>(writer: W, table: &PriceTable) -> Result<(), StorageError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp"];
    header.extend(PriceField::ALL.iter().map(|f| f.as_str()));
    csv_writer.write_record(&header)?;

    for record in table.records() {
        let mut row = vec![record.date.format("%Y-%m-%d").to_string()];
        row.extend(
            PriceField::ALL
                .iter()
                .map(|&f| record.get(f).map(|d| d.to_string()).unwrap_or_default()),
        );
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes several series side by side, joined on date.
///
/// Differenced series start one day later than the level, so cells a series does not cover
/// are left empty.
pub fn write_series(path: &Path, series: &[&Series]) -> Result<(), StorageError> {
    create_parent(path)?;
    write_series_to(File::create(path)?, series)?;
    tracing::info!("Wrote {} series to {}", series.len(), path.display());
    Ok(())
}

pub fn write_series_to<W: Write>(writer: W, series: &[&Series]) -> Result<(), StorageError> {
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (column, s) in series.iter().enumerate() {
        for (date, value) in s.dates().iter().zip(s.values()) {
            rows.entry(*date).or_insert_with(|| vec![None; series.len()])[column] = Some(*value);
        }
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut header = vec!["date".to_string()];
    header.extend(series.iter().map(|s| s.name().to_string()));
    csv_writer.write_record(&header)?;

    for (date, values) in rows {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        row.extend(
            values
                .into_iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_prices;

    #[test]
    fn written_prices_read_back_identically() {
        let input = "\
Date,Open (USD),High (USD),Low (USD),Close (USD),Volume,Market Cap (USD)
2024-01-01,1.5,2,1,1.75,100,
2024-01-02,1.75,2.5,1.5,2.25,,3000
";
        let original = read_prices(input.as_bytes(), "SOL").unwrap().table;

        let mut buffer = Vec::new();
        write_prices_to(&mut buffer, &original).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("timestamp,open,high,low,close,volume,market_cap\n"));

        let reread = read_prices(buffer.as_slice(), "SOL").unwrap().table;
        assert_eq!(reread, original);
    }

    #[test]
    fn series_are_joined_on_date() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let level = Series::new("close", vec![d(1), d(2), d(3)], vec![10.0, 11.0, 13.0]).unwrap();
        let diff = Series::new("close_diff", vec![d(2), d(3)], vec![1.0, 2.0]).unwrap();

        let mut buffer = Vec::new();
        write_series_to(&mut buffer, &[&level, &diff]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "date,close,close_diff\n2024-01-01,10,\n2024-01-02,11,1\n2024-01-03,13,2\n"
        );
    }
}
