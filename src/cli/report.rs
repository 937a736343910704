use std::{fmt::Display, io::IsTerminal, path::Path};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    daemon::storage::{
        entities::{MonthKey, UsageLog},
        usage_store::UsageStore,
    },
    query::{daily_totals, day_detail, day_total, top_n, view::ViewState},
};

use super::{
    output::{render_day, render_month, render_months},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct MonthCommand {
    #[arg(long, help = "Month formatted as YYYY-MM. Defaults to the newest month with usage")]
    month: Option<MonthKey>,
}

#[derive(Debug, Parser)]
pub struct DayCommand {
    #[arg(
        long,
        short,
        help = "Day to display. Examples are \"today\", \"yesterday\", \"15/03/2025\". Defaults to the latest recorded day"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(short, long, default_value_t = 5, help = "Number of applications in the top section")]
    top: usize,
}

async fn load_log(dir: &Path) -> UsageLog {
    UsageStore::in_dir(dir).load().await
}

pub async fn process_months_command(dir: &Path) -> Result<()> {
    let log = load_log(dir).await;
    print!("{}", render_months(ViewState::from_log(&log).months()));
    Ok(())
}

/// Prints daily totals of the requested month, or of the newest month when none was requested.
pub async fn process_month_command(MonthCommand { month }: MonthCommand, dir: &Path) -> Result<()> {
    let log = load_log(dir).await;
    let mut view = ViewState::from_log(&log);

    let month = match month {
        Some(month) => {
            view.select_month(month);
            month
        }
        None => match view.current_month() {
            Some(month) => month,
            None => {
                println!("No usage recorded yet");
                return Ok(());
            }
        },
    };

    let colored = std::io::stdout().is_terminal();
    print!("{}", render_month(month, &daily_totals(&log, month), colored));

    if view.current_month() == Some(month) {
        if let Some(navigation) = navigation_hint(&view) {
            println!("{navigation}");
        }
    }
    Ok(())
}

/// Neighbouring months that also have usage.
fn navigation_hint(view: &ViewState) -> Option<String> {
    let mut previous = view.clone();
    let mut next = view.clone();
    let previous = previous
        .previous_month()
        .then(|| previous.current_month())
        .flatten();
    let next = next.next_month().then(|| next.current_month()).flatten();
    match (previous, next) {
        (None, None) => None,
        (previous, next) => Some(format!(
            "previous: {}\tnext: {}",
            previous.map_or_else(|| "-".to_string(), |v| v.to_string()),
            next.map_or_else(|| "-".to_string(), |v| v.to_string()),
        )),
    }
}

pub async fn process_day_command(
    DayCommand {
        date,
        date_style,
        top,
    }: DayCommand,
    dir: &Path,
) -> Result<()> {
    let log = load_log(dir).await;

    let date = match date {
        Some(date) => parse_day(&date, date_style)?,
        None => match ViewState::from_log(&log).detail_date(&log) {
            Some(date) => date,
            None => {
                println!("No usage recorded yet");
                return Ok(());
            }
        },
    };

    print!(
        "{}",
        render_day(
            date,
            day_total(&log, date),
            &day_detail(&log, date),
            &top_n(&log, date, top),
        )
    );
    Ok(())
}

fn parse_day(value: &str, date_style: DateStyle) -> Result<NaiveDate> {
    match parse_date_string(value, Local::now(), date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
    }
}
