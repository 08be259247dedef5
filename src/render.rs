//! Terminal output: comfy-table tables and the text charts.

use analytics::report::{ColumnSummary, StationarityReport, TransformAnalysis};
use anyhow::Context;
use charts::{ChartOptions, acf_chart, line_chart};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::ChartSettings;
use core_types::{PriceTable, Series, Transform};
use storage::DataQuality;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn fmt(v: f64) -> String {
    if v.abs() >= 1e5 || (v != 0.0 && v.abs() < 1e-3) {
        format!("{:.3e}", v)
    } else {
        format!("{:.4}", v)
    }
}

fn fmt_lags(lags: &[usize]) -> String {
    if lags.is_empty() {
        return "none".to_string();
    }
    lags.iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_quality(table: &PriceTable, quality: &DataQuality) {
    println!(
        "{}: {} rows from {} to {}",
        table.symbol(),
        quality.rows,
        quality.first_date,
        quality.last_date
    );
    println!(
        "Calendar gaps: {} ({} missing days)",
        quality.gaps.len(),
        quality.missing_days
    );
    for (before, after) in quality.gaps.iter().take(10) {
        println!("  {} -> {}", before, after);
    }
    if quality.gaps.len() > 10 {
        println!("  ... and {} more", quality.gaps.len() - 10);
    }
    if !quality.unknown_columns.is_empty() {
        println!("Ignored columns: {}", quality.unknown_columns.join(", "));
    }

    let mut out = new_table(vec!["column", "present", "missing", "missing %"]);
    for column in &quality.columns {
        out.add_row(vec![
            column.field.to_string(),
            (if column.present { "yes" } else { "no" }).to_string(),
            column.missing.to_string(),
            format!("{:.2}", column.missing_pct),
        ]);
    }
    println!("{out}");
}

pub fn print_summaries(summaries: &[ColumnSummary], quality: &DataQuality) {
    let mut out = new_table(vec![
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max", "skew", "kurt",
    ]);
    for column in summaries {
        let present = quality
            .column(column.field)
            .is_some_and(|c| c.present);
        let Some(s) = column.summary.as_ref().filter(|_| present) else {
            continue;
        };
        out.add_row(vec![
            column.field.to_string(),
            s.count.to_string(),
            fmt(s.mean),
            fmt(s.std),
            fmt(s.min),
            fmt(s.q25),
            fmt(s.median),
            fmt(s.q75),
            fmt(s.max),
            fmt(s.skewness),
            fmt(s.excess_kurtosis),
        ]);
    }
    println!("{out}");
}

pub fn print_report(report: &StationarityReport, settings: &ChartSettings) -> anyhow::Result<()> {
    println!(
        "{} {}: {} observations from {} to {}\n",
        report.symbol, report.field, report.observations, report.first_date, report.last_date
    );

    let mut out = new_table(vec![
        "series", "n", "mean", "std", "ADF", "ADF p", "KPSS", "KPSS p", "shift", "var ratio",
        "LB p", "verdict",
    ]);
    for t in &report.transforms {
        let check = &t.stationarity;
        out.add_row(vec![
            t.series.name().to_string(),
            t.observations.to_string(),
            fmt(t.summary.mean),
            fmt(t.summary.std),
            fmt(check.adf.statistic),
            format!("{:.4}", check.adf.p_value),
            fmt(check.kpss.statistic),
            format!("{:.3}", check.kpss.p_value),
            fmt(check.stability.mean_shift),
            fmt(check.stability.variance_ratio),
            format!("{:.4}", t.ljung_box.p_value),
            check.verdict.to_string(),
        ]);
    }
    println!("{out}");

    for t in &report.transforms {
        println!(
            "{}: significant ACF lags [{}], PACF lags [{}] (bound ±{:.3})",
            t.series.name(),
            fmt_lags(&t.significant_acf_lags),
            fmt_lags(&t.significant_pacf_lags),
            t.acf_bound
        );
    }
    if let Some(squared) = &report.squared_returns {
        println!(
            "squared log returns: significant ACF lags [{}] (bound ±{:.3}), Ljung-Box Q = {:.2}, p = {:.4}",
            fmt_lags(&squared.significant_lags),
            squared.acf_bound,
            squared.ljung_box.statistic,
            squared.ljung_box.p_value
        );
    }

    if settings.enabled {
        print_charts(report, settings)?;
    }

    println!("\nRecommendations:");
    for recommendation in &report.recommendations {
        println!("  - {}", recommendation);
    }
    Ok(())
}

fn print_charts(report: &StationarityReport, settings: &ChartSettings) -> anyhow::Result<()> {
    let options = ChartOptions::new(settings.width, settings.height);

    if let Some(level) = report.level() {
        let title = format!(
            "{} with {}-day moving average (.)",
            level.series.name(),
            report.rolling.window
        );
        let chart = line_chart(
            &level.series,
            Some(report.rolling.sma.as_slice()),
            &options.clone().with_title(title),
        )
        .context("Failed to draw the level chart")?;
        println!("\n{chart}");
    }

    let returns = report
        .transform(Transform::LogDiff)
        .or_else(|| report.transform(Transform::Diff));
    if let Some(returns) = returns {
        let chart = line_chart(&returns.series, None, &options)
            .context("Failed to draw the returns chart")?;
        println!("{chart}");
    }

    for t in report.transforms.iter().filter(|t| t.transform != Transform::Log) {
        println!("{}", correlogram(t, "ACF", &t.acf, settings.width)?);
    }
    if let Some(returns) = returns {
        println!("{}", correlogram(returns, "PACF", &returns.pacf, settings.width)?);
    }
    Ok(())
}

fn correlogram(
    t: &TransformAnalysis,
    label: &str,
    values: &[f64],
    width: usize,
) -> anyhow::Result<String> {
    let title = format!("{} of {}", label, series_title(&t.series));
    acf_chart(values, t.acf_bound, &title, width)
        .with_context(|| format!("Failed to draw the {} chart", label))
}

fn series_title(series: &Series) -> String {
    format!("{} (n={})", series.name(), series.len())
}
