//! Text rendering of query results. Rows are tab separated so that output stays usable with
//! `cut` and `awk`.

use std::fmt::Write;

use ansi_term::Colour;
use chrono::NaiveDate;

use crate::{
    daemon::storage::entities::{AppUsage, MonthKey},
    utils::{
        percentage::{share_of, Percentage},
        time::{date_key, day_label, format_duration},
    },
};

const BAR_WIDTH: usize = 40;

/// Bars are never scaled to less than 10 minutes, so short days don't fill the whole width.
const MIN_BAR_SCALE: u64 = 600;

/// Largest value a bar is scaled to. Leaves some headroom above the longest day.
fn bar_scale(totals: &[(NaiveDate, u64)]) -> u64 {
    let max = totals.iter().map(|(_, total)| *total).max().unwrap_or(0);
    MIN_BAR_SCALE.max(max.saturating_add(max / 10))
}

/// Number of cells a bar of `seconds` takes. Any usage at all gets at least one cell.
fn bar_cells(seconds: u64, scale: u64) -> usize {
    if seconds == 0 || scale == 0 {
        return 0;
    }
    let cells = (seconds as f64 / scale as f64 * BAR_WIDTH as f64).round() as usize;
    cells.clamp(1, BAR_WIDTH)
}

pub fn render_months(months: &[MonthKey]) -> String {
    if months.is_empty() {
        return "No usage recorded yet\n".into();
    }
    let mut output = String::new();
    for month in months {
        let _ = writeln!(output, "{month}");
    }
    output
}

/// Daily totals of `month`, one row per recorded day with a bar proportional to its total.
pub fn render_month(month: MonthKey, totals: &[(NaiveDate, u64)], colored: bool) -> String {
    if totals.is_empty() {
        return format!("No usage recorded for {month}\n");
    }

    let scale = bar_scale(totals);
    let mut output = String::new();
    for (date, total) in totals {
        let bar = "█".repeat(bar_cells(*total, scale));
        let bar = if colored {
            Colour::Green.paint(bar).to_string()
        } else {
            bar
        };
        let _ = writeln!(
            output,
            "{}\t{}\t{}",
            day_label(*date),
            format_duration(*total),
            bar
        );
    }
    let sum = totals
        .iter()
        .fold(0, |sum: u64, (_, total)| sum.saturating_add(*total));
    let _ = writeln!(output, "total\t{}", format_duration(sum));
    output
}

/// Breakdown of a day taking `total` seconds. `detail` has to be sorted by the caller, `top` is
/// appended as a separate section.
pub fn render_day(date: NaiveDate, total: u64, detail: &[AppUsage], top: &[AppUsage]) -> String {
    if detail.is_empty() {
        return format!("No usage recorded for {}\n", date_key(date));
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}\t{}", date_key(date), format_duration(total));
    for usage in detail {
        write_usage(&mut output, usage, share_of(usage.seconds, total));
    }

    if !top.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Top {}", top.len());
        for usage in top {
            write_usage(&mut output, usage, share_of(usage.seconds, total));
        }
    }
    output
}

fn write_usage(output: &mut String, usage: &AppUsage, share: Percentage) {
    let _ = writeln!(
        output,
        "{}%\t{}\t{}",
        *share as i32,
        format_duration(usage.seconds),
        usage.app
    );
}
