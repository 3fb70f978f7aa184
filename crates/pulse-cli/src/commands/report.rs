//! Report command for window analytics.
//!
//! Implements `pulse report` with the 7d/30d/90d window options and output
//! formats (human-readable, JSON).

use std::fmt::Write;

use anyhow::{Context, Result};

use pulse_core::{AnalyticsReport, MetricsSnapshot, OwnerId, Window};
use pulse_db::Database;

/// Runs the report command.
pub fn run(db: &Database, owner: &str, window: &str, json: bool) -> Result<()> {
    let owner = OwnerId::new(owner)?;
    let window: Window = window
        .parse()
        .context("invalid --window, expected 7d, 30d, or 90d")?;
    let report = pulse_core::query_analytics(db, &owner, window)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, window));
    }

    Ok(())
}

/// Formats the human-readable report output.
pub fn format_report(report: &AnalyticsReport, window: Window) -> String {
    let mut output = String::new();

    let range = match (report.series.first(), report.series.last()) {
        (Some(first), Some(last)) => format!(" ({} to {})", first.date, last.date),
        _ => String::new(),
    };
    writeln!(output, "USAGE REPORT: last {} days{range}", window.days()).unwrap();

    let metrics = &report.metrics;
    if *metrics == MetricsSnapshot::default() {
        writeln!(output).unwrap();
        writeln!(output, "No events recorded in the last {} days.", window.days()).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: run 'pulse record' to add events.").unwrap();
        return output;
    }

    writeln!(output).unwrap();
    writeln!(output, "TOTALS").unwrap();
    writeln!(output, "──────").unwrap();
    writeln!(output, "Plays:            {}", metrics.total_plays).unwrap();
    writeln!(output, "Unique listeners: {}", metrics.unique_listeners).unwrap();
    writeln!(
        output,
        "Revenue:          {}",
        format_revenue(metrics.total_revenue)
    )
    .unwrap();
    writeln!(
        output,
        "Gems:             {}",
        format_quantity(metrics.total_gems)
    )
    .unwrap();
    writeln!(output, "Likes:            {}", metrics.total_likes).unwrap();
    writeln!(output, "Shares:           {}", metrics.total_shares).unwrap();

    writeln!(output).unwrap();
    writeln!(output, "BY DAY").unwrap();
    writeln!(output, "──────").unwrap();

    let max_plays = report.series.iter().map(|b| b.plays).max().unwrap_or(0);
    for bucket in &report.series {
        writeln!(
            output,
            "{}  {:>6}  {}",
            bucket.date,
            bucket.plays,
            play_bar(bucket.plays, max_plays)
        )
        .unwrap();
    }

    output
}

/// Formats a currency amount with two decimals.
fn format_revenue(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Gems carry fractional values only when the source supplied them.
#[allow(clippy::float_cmp)]
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity:.2}")
    }
}

/// Generates a 10-character bar scaled against the window's busiest day.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn play_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░".repeat(10);
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1 // Minimum 1 for visibility
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use pulse_core::DayBucket;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).expect("valid test date")
    }

    fn bucket(day: u32, plays: u64) -> DayBucket {
        DayBucket {
            date: date(day),
            plays,
            revenue: 0.0,
            gems: 0.0,
            likes: 0,
            shares: 0,
            unique_listeners_count: 0,
        }
    }

    // ========== Bar Tests ==========

    #[test]
    fn bar_full() {
        assert_eq!(play_bar(100, 100), "██████████");
    }

    #[test]
    fn bar_partial() {
        assert_eq!(play_bar(50, 100), "█████░░░░░");
        assert_eq!(play_bar(80, 100), "████████░░");
        assert_eq!(play_bar(20, 100), "██░░░░░░░░");
    }

    #[test]
    fn bar_minimum_visibility() {
        assert_eq!(play_bar(1, 100), "█░░░░░░░░░");
        assert_eq!(play_bar(4, 100), "█░░░░░░░░░");
    }

    #[test]
    fn bar_zero_max() {
        assert_eq!(play_bar(0, 0), "░░░░░░░░░░");
    }

    // ========== Value Formatting ==========

    #[test]
    fn revenue_formats_two_decimals() {
        assert_snapshot!(format_revenue(9.99), @"$9.99");
        assert_snapshot!(format_revenue(0.0), @"$0.00");
        assert_snapshot!(format_revenue(129.5), @"$129.50");
    }

    #[test]
    fn quantity_drops_decimals_for_whole_numbers() {
        assert_snapshot!(format_quantity(23.0), @"23");
        assert_snapshot!(format_quantity(2.5), @"2.50");
        assert_snapshot!(format_quantity(0.0), @"0");
    }

    // ========== Report Formatting ==========

    #[test]
    fn report_shows_totals_and_day_rows() {
        let report = AnalyticsReport {
            metrics: MetricsSnapshot {
                total_plays: 5,
                total_revenue: 9.99,
                total_gems: 0.0,
                total_likes: 1,
                total_shares: 0,
                unique_listeners: 2,
            },
            series: vec![bucket(8, 0), bucket(9, 4), bucket(10, 1)],
        };

        let output = format_report(&report, Window::Days7);

        assert!(output.starts_with("USAGE REPORT: last 7 days (2025-06-08 to 2025-06-10)\n"));
        assert!(output.contains("Plays:            5\n"));
        assert!(output.contains("Unique listeners: 2\n"));
        assert!(output.contains("Revenue:          $9.99\n"));

        let busiest = output
            .lines()
            .find(|line| line.starts_with("2025-06-09"))
            .expect("day row for June 9");
        assert!(busiest.contains(" 4 "));
        assert!(busiest.ends_with("██████████"));

        let quiet = output
            .lines()
            .find(|line| line.starts_with("2025-06-08"))
            .expect("day row for June 8");
        assert!(quiet.ends_with("░░░░░░░░░░"));
    }

    #[test]
    fn day_rows_keep_series_order() {
        let report = AnalyticsReport {
            metrics: MetricsSnapshot {
                total_plays: 2,
                ..MetricsSnapshot::default()
            },
            series: vec![bucket(8, 1), bucket(9, 0), bucket(10, 1)],
        };

        let output = format_report(&report, Window::Days7);

        let day_lines: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("2025-06-"))
            .collect();
        assert_eq!(day_lines.len(), 3);
        assert!(day_lines[0].starts_with("2025-06-08"));
        assert!(day_lines[1].starts_with("2025-06-09"));
        assert!(day_lines[2].starts_with("2025-06-10"));
    }

    #[test]
    fn empty_report_prints_hint_instead_of_rows() {
        let report = AnalyticsReport {
            metrics: MetricsSnapshot::default(),
            series: (4..=10).map(|day| bucket(day, 0)).collect(),
        };

        let output = format_report(&report, Window::Days7);

        assert!(output.contains("No events recorded in the last 7 days."));
        assert!(output.contains("Hint: run 'pulse record' to add events."));
        assert!(!output.contains("░"));
    }
}
