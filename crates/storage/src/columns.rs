use core_types::PriceField;
use std::fmt;

/// What a CSV header refers to after cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Date,
    Field(PriceField),
    Unknown(String),
}

impl Column {
    /// Resolves a raw header, e.g. `"Close (USD)"` becomes `Column::Field(PriceField::Close)`.
    pub fn resolve(raw: &str) -> Self {
        let cleaned = clean_header(raw);
        match cleaned.as_str() {
            "timestamp" | "time" | "date" | "day" | "time_open" | "timeopen" | "trading_date"
            | "open_time" => Column::Date,
            other => match other.parse::<PriceField>() {
                Ok(field) => Column::Field(field),
                Err(_) => Column::Unknown(cleaned),
            },
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Date => f.write_str("timestamp"),
            Column::Field(field) => write!(f, "{}", field),
            Column::Unknown(name) => f.write_str(name),
        }
    }
}

/// Normalises a header to `snake_case` and drops unit annotations.
///
/// `" Market Cap (USD) "` -> `"market_cap"`, `"close [usd]"` -> `"close"`, `"Close-USD"` is
/// left as `"close_usd"` because a bare suffix is ambiguous.
pub fn clean_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;

    for c in raw.trim_start_matches('\u{feff}').chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_whitespace() || c == '-' || c == '_' || c == '.' => {
                if !out.is_empty() && !out.ends_with('_') {
                    out.push('_');
                }
            }
            c => out.extend(c.to_lowercase()),
        }
    }

    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_units_and_normalises_case() {
        assert_eq!(clean_header("Close (USD)"), "close");
        assert_eq!(clean_header(" Market Cap (USD) "), "market_cap");
        assert_eq!(clean_header("close [usd]"), "close");
        assert_eq!(clean_header("\u{feff}timestamp"), "timestamp");
        assert_eq!(clean_header("Time--Open"), "time_open");
    }

    #[test]
    fn resolves_known_columns() {
        assert_eq!(Column::resolve("timestamp"), Column::Date);
        assert_eq!(Column::resolve("Date"), Column::Date);
        assert_eq!(Column::resolve("open (USD)"), Column::Field(PriceField::Open));
        assert_eq!(Column::resolve("market_cap (USD)"), Column::Field(PriceField::MarketCap));
        assert_eq!(Column::resolve("Volume"), Column::Field(PriceField::Volume));
        assert_eq!(
            Column::resolve("Adj Close"),
            Column::Unknown("adj_close".to_string())
        );
    }
}
