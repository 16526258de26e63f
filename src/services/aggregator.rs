//! Aggregator service for weekly hour reports

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::services::weeks::Week;
use crate::types::{CategoryHours, DayReport, Entry, Result, WeekReport};

/// Source of entries for a date range
pub trait EntryLookup {
    /// Entries dated within `[start, end]`, both ends inclusive, in any order
    fn find_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Entry>>;
}

impl EntryLookup for [Entry] {
    fn find_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Entry>> {
        Ok(self
            .iter()
            .filter(|e| start <= e.date && e.date <= end)
            .cloned()
            .collect())
    }
}

impl EntryLookup for Vec<Entry> {
    fn find_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Entry>> {
        self.as_slice().find_entries_in_range(start, end)
    }
}

/// Aggregator for weekly category-hour totals
pub struct WeeklyAggregator;

impl WeeklyAggregator {
    /// One report per week, in the order the weeks are given (oldest first
    /// when fed from `recent_weeks`). Issues one lookup per week.
    pub fn aggregate<L>(weeks: &[Week], lookup: &L) -> Result<Vec<WeekReport>>
    where
        L: EntryLookup + ?Sized,
    {
        let mut reports = Vec::with_capacity(weeks.len());
        for week in weeks {
            let entries = lookup.find_entries_in_range(week.first(), week.last())?;
            reports.push(Self::week(week, entries));
        }
        Ok(reports)
    }

    /// Bucket `entries` into the days of `week`, summing hours per category.
    ///
    /// Every day of the week is present, with empty totals when nothing was
    /// logged. Entries outside the week are ignored.
    pub fn week(week: &Week, mut entries: Vec<Entry>) -> WeekReport {
        let mut days: BTreeMap<NaiveDate, DayReport> = week
            .days()
            .iter()
            .map(|&date| (date, DayReport::new(date)))
            .collect();
        let mut category_hours = CategoryHours::new();

        entries.sort_by_key(|e| (e.date, e.id));
        for entry in entries {
            let Some(day) = days.get_mut(&entry.date) else {
                continue;
            };
            *category_hours.entry(entry.category).or_insert(0.0) += entry.hours;
            *day.category_hours.entry(entry.category).or_insert(0.0) += entry.hours;
            day.entries.push(entry);
        }

        WeekReport {
            start_date: week.first(),
            end_date: week.last(),
            category_hours,
            days: days.into_values().collect(),
        }
    }

    /// Sum category totals across several week reports
    pub fn totals(reports: &[WeekReport]) -> CategoryHours {
        let mut totals = CategoryHours::new();
        for report in reports {
            for (category, hours) in &report.category_hours {
                *totals.entry(*category).or_insert(0.0) += hours;
            }
        }
        totals
    }
}
