use crate::error::ChartError;
use crate::MIN_WIDTH;

const BAR: char = '#';
const BOUND: char = ':';

/// Horizontal bar chart of autocorrelation coefficients, one row per lag.
///
/// The axis sits in the middle; negative coefficients extend to the left. Bars are scaled
/// so that `|r| = 1` fills half the width, and `:` marks the `±bound` band. Lags `>= 1`
/// outside the band are flagged with `*`.
pub fn acf_chart(
    values: &[f64],
    bound: f64,
    title: &str,
    width: usize,
) -> Result<String, ChartError> {
    if width < MIN_WIDTH {
        return Err(ChartError::InvalidSize {
            width,
            height: values.len(),
            min_width: MIN_WIDTH,
            min_height: 1,
        });
    }
    if values.is_empty() {
        return Err(ChartError::Empty(title.to_string()));
    }

    let half = width / 2;
    let cells = |v: f64| ((v.abs().min(1.0)) * half as f64).round() as usize;
    let bound_cell = cells(bound).clamp(1, half) - 1;

    let mut out = format!("{}\n", title);
    for (lag, &value) in values.iter().enumerate() {
        let len = cells(value);
        let mut left = vec![' '; half];
        let mut right = vec![' '; half];
        if value < 0.0 {
            left[half - len..].fill(BAR);
        } else {
            right[..len].fill(BAR);
        }
        if left[half - 1 - bound_cell] == ' ' {
            left[half - 1 - bound_cell] = BOUND;
        }
        if right[bound_cell] == ' ' {
            right[bound_cell] = BOUND;
        }

        let flag = if lag > 0 && value.abs() > bound { '*' } else { ' ' };
        let left: String = left.into_iter().collect();
        let right: String = right.into_iter().collect();
        out.push_str(&format!(
            "{:>3} {:>7.3} {}{}|{}\n",
            lag,
            value,
            flag,
            left,
            right.trim_end()
        ));
    }
    out.push_str(&format!("bound = ±{:.3}\n", bound));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(chart: &str) -> Vec<&str> {
        chart.lines().skip(1).filter(|l| l.contains('|')).collect()
    }

    #[test]
    fn one_row_per_lag() {
        let chart = acf_chart(&[1.0, 0.5, 0.1], 0.2, "ACF close", 20).unwrap();
        assert!(chart.starts_with("ACF close\n"));
        assert_eq!(rows(&chart).len(), 3);
        assert!(chart.ends_with("bound = ±0.200\n"));
    }

    #[test]
    fn lag_zero_fills_the_right_half() {
        let chart = acf_chart(&[1.0], 0.2, "acf", 20).unwrap();
        let row = rows(&chart)[0];
        let (_, right) = row.split_once('|').unwrap();
        assert_eq!(right, "#".repeat(10));
        assert!(!row[..12].contains('*'));
    }

    #[test]
    fn negative_bars_grow_left_of_the_axis() {
        let chart = acf_chart(&[1.0, -0.5], 0.2, "acf", 20).unwrap();
        let row = rows(&chart)[1];
        let (left, right) = row.split_once('|').unwrap();
        assert!(left.ends_with("#####"));
        assert!(!right.contains('#'));
        assert!(row.contains('*'));
    }

    #[test]
    fn small_coefficients_stay_inside_the_band() {
        let chart = acf_chart(&[1.0, 0.08], 0.2, "acf", 20).unwrap();
        let row = rows(&chart)[1];
        let (left, right) = row.split_once('|').unwrap();
        assert!(!left.contains('*'));
        assert!(left.ends_with(": "));
        assert_eq!(right, "#:");
    }

    #[test]
    fn rejects_narrow_or_empty_charts() {
        assert!(matches!(
            acf_chart(&[1.0], 0.2, "acf", 4),
            Err(ChartError::InvalidSize { .. })
        ));
        assert!(matches!(
            acf_chart(&[], 0.2, "acf", 20),
            Err(ChartError::Empty(_))
        ));
    }
}
