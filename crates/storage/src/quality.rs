use chrono::NaiveDate;
use core_types::{PriceField, PriceTable};
use serde::Serialize;

/// Missing cells in one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnQuality {
    pub field: PriceField,
    /// False when the file has no such column at all.
    pub present: bool,
    pub missing: usize,
    pub missing_pct: f64,
}

/// A descriptive summary of the loaded file. Nothing here is corrected or imputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub columns: Vec<ColumnQuality>,
    pub unknown_columns: Vec<String>,
    /// Consecutive rows more than one calendar day apart.
    pub gaps: Vec<(NaiveDate, NaiveDate)>,
    /// Calendar days inside the covered range that have no row.
    pub missing_days: i64,
}

impl DataQuality {
    pub fn assess(table: &PriceTable, present: &[PriceField], unknown_columns: Vec<String>) -> Self {
        let rows = table.len();
        let columns = PriceField::ALL
            .iter()
            .map(|&field| {
                let is_present = present.contains(&field);
                let missing = if is_present { table.missing(field) } else { rows };
                ColumnQuality {
                    field,
                    present: is_present,
                    missing,
                    missing_pct: missing as f64 / rows as f64 * 100.0,
                }
            })
            .collect();

        let gaps = table.calendar_gaps();
        let missing_days = gaps.iter().map(|(a, b)| (*b - *a).num_days() - 1).sum();

        Self {
            rows,
            first_date: table.first_date(),
            last_date: table.last_date(),
            columns,
            unknown_columns,
            gaps,
            missing_days,
        }
    }

    /// Total missing cells across the columns that exist in the file.
    pub fn total_missing(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.present)
            .map(|c| c.missing)
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.total_missing() == 0 && self.gaps.is_empty()
    }

    pub fn column(&self, field: PriceField) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.field == field)
    }
}
