//! `punchcard report` subcommands

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde::Serialize;

use punchcard::services::{parse_day, recent_weeks, JsonStore, WeekStart, WeeklyAggregator};
use punchcard::types::{CategoryId, WeekReport};

use super::render::{category_label, week_report};
use super::{to_json, Context};

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Hours per category for the most recent weeks
    Weekly {
        /// Number of weeks to show; non-positive values use the configured default
        #[arg(long, allow_negative_numbers = true)]
        weeks: Option<i64>,

        /// Day whose week is shown last, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        day: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct WeeklyOutput {
    n_weeks: usize,
    target_day: NaiveDate,
    week_start: WeekStart,
    /// Oldest week first
    weeks: Vec<WeekReport>,
    labels: BTreeMap<CategoryId, String>,
}

impl ReportCommand {
    pub fn run(self, ctx: &Context) -> anyhow::Result<String> {
        match self {
            Self::Weekly { weeks, day, json } => {
                let week_start = ctx.settings.week_start()?;
                let n_weeks = resolve_weeks(weeks, ctx.settings.default_weeks);
                let today = Local::now().date_naive();
                let target_day = resolve_day(day.as_deref(), today);
                weekly(&ctx.store, n_weeks, target_day, week_start, json)
            }
        }
    }
}

/// Missing or non-positive counts fall back to `default`
fn resolve_weeks(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(default),
        Some(n) => {
            tracing::warn!("ignoring week count {}, using {}", n, default);
            default
        }
        None => default,
    }
}

/// Unparseable days fall back to `today`
fn resolve_day(requested: Option<&str>, today: NaiveDate) -> NaiveDate {
    match requested.map(parse_day) {
        Some(Ok(day)) => day,
        Some(Err(err)) => {
            tracing::warn!("{}; reporting on {} instead", err, today);
            today
        }
        None => today,
    }
}

fn weekly(
    store: &JsonStore,
    n_weeks: usize,
    target_day: NaiveDate,
    week_start: WeekStart,
    json: bool,
) -> anyhow::Result<String> {
    let weeks = recent_weeks(n_weeks, target_day, week_start)?;
    let reports = WeeklyAggregator::aggregate(&weeks, store)?;
    let tree = store.load_tree()?;

    if json {
        let labels = reports
            .iter()
            .flat_map(|r| r.category_hours.keys().copied())
            .map(|id| (id, category_label(&tree, id)))
            .collect();
        return to_json(&WeeklyOutput {
            n_weeks,
            target_day,
            week_start,
            weeks: reports,
            labels,
        });
    }

    // Most recent week on top
    let sections: Vec<String> = reports
        .iter()
        .rev()
        .map(|report| week_report(&tree, report))
        .collect();
    Ok(sections.join("\n\n"))
}
