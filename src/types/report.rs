//! Weekly report types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CategoryId, Entry};

/// Hours per category, keyed by id for a stable ordering
pub type CategoryHours = BTreeMap<CategoryId, f64>;

/// One day inside a week report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    /// English weekday name, e.g. "Monday"
    pub weekday_name: String,
    pub category_hours: CategoryHours,
    pub entries: Vec<Entry>,
}

impl DayReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            weekday_name: date.format("%A").to_string(),
            category_hours: CategoryHours::new(),
            entries: Vec::new(),
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.category_hours.values().sum()
    }
}

/// Aggregated hours for one week bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category_hours: CategoryHours,
    /// Days in ascending date order, including days without entries
    pub days: Vec<DayReport>,
}

impl WeekReport {
    pub fn first_day(&self) -> Option<&DayReport> {
        self.days.first()
    }

    pub fn total_hours(&self) -> f64 {
        self.category_hours.values().sum()
    }

    /// Whether `date` falls inside this week
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
