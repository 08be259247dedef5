use crate::error::ChartError;
use crate::{MIN_HEIGHT, MIN_WIDTH};
use core_types::Series;

const SERIES_MARK: char = '*';
const OVERLAY_MARK: char = '.';

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Plot area width in characters, excluding the y-axis labels.
    pub width: usize,
    /// Plot area height in rows.
    pub height: usize,
    /// Defaults to the series name.
    pub title: Option<String>,
}

impl ChartOptions {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(ChartError::InvalidSize {
                width: self.width,
                height: self.height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }
        Ok(())
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::new(72, 14)
    }
}

/// Renders `series` as a text line chart, with `overlay` (aligned with the series) drawn
/// underneath it. Series longer than the width are reduced to bucket means.
pub fn line_chart(
    series: &Series,
    overlay: Option<&[Option<f64>]>,
    options: &ChartOptions,
) -> Result<String, ChartError> {
    options.validate()?;
    if series.is_empty() {
        return Err(ChartError::Empty(series.name().to_string()));
    }
    if let Some(overlay) = overlay {
        if overlay.len() != series.len() {
            return Err(ChartError::LengthMismatch {
                series: series.len(),
                overlay: overlay.len(),
            });
        }
    }

    let buckets = bucket_ranges(series.len(), options.width);
    let points: Vec<Option<f64>> = buckets
        .iter()
        .map(|&(start, end)| bucket_mean(series.values()[start..end].iter().copied()))
        .collect();
    let overlay_points: Vec<Option<f64>> = match overlay {
        Some(overlay) => buckets
            .iter()
            .map(|&(start, end)| bucket_mean(overlay[start..end].iter().flatten().copied()))
            .collect(),
        None => vec![None; buckets.len()],
    };

    let (lo, hi) = value_range(points.iter().chain(&overlay_points).flatten().copied());
    let rows = options.height;
    let row_of = |v: f64| -> usize {
        let scaled = (hi - v) / (hi - lo) * (rows - 1) as f64;
        (scaled.round() as usize).min(rows - 1)
    };

    let mut grid = vec![vec![' '; buckets.len()]; rows];
    for (col, v) in overlay_points.iter().enumerate() {
        if let Some(v) = v {
            grid[row_of(*v)][col] = OVERLAY_MARK;
        }
    }
    for (col, v) in points.iter().enumerate() {
        if let Some(v) = v {
            grid[row_of(*v)][col] = SERIES_MARK;
        }
    }

    let middle = (rows - 1) / 2;
    let label_for = |row: usize| -> String {
        if row == 0 || row == middle || row == rows - 1 {
            let v = hi - (hi - lo) * row as f64 / (rows - 1) as f64;
            format!("{:.2}", v)
        } else {
            String::new()
        }
    };
    let labels: Vec<String> = (0..rows).map(label_for).collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let title = options.title.as_deref().unwrap_or(series.name());
    let mut out = format!("{}\n", title);
    for (label, row) in labels.iter().zip(&grid) {
        let line: String = row.iter().collect();
        out.push_str(&format!("{:>w$} |{}\n", label, line.trim_end(), w = label_width));
    }
    out.push_str(&format!("{:>w$} +{}\n", "", "-".repeat(buckets.len()), w = label_width));

    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        let (first, last) = (first.to_string(), last.to_string());
        let gap = buckets.len().saturating_sub(first.len() + last.len()).max(1);
        out.push_str(&format!(
            "{:>w$}  {}{}{}\n",
            "",
            first,
            " ".repeat(gap),
            last,
            w = label_width
        ));
    }

    tracing::debug!(points = series.len(), columns = buckets.len(), "Line chart rendered");
    Ok(out)
}

/// Splits `0..n` into at most `width` contiguous, non-empty ranges.
fn bucket_ranges(n: usize, width: usize) -> Vec<(usize, usize)> {
    let columns = n.min(width);
    (0..columns)
        .map(|i| (i * n / columns, (i + 1) * n / columns))
        .collect()
}

fn bucket_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi > lo {
        return (lo, hi);
    }
    // Flat line: open a band around it so it lands mid-chart.
    let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
    (lo - pad, hi + pad)
}
