//! Work log entries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CategoryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A log of work accomplished on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub category: CategoryId,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub description: String,
}

/// Fields supplied when creating or replacing an entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub category: CategoryId,
    pub date: NaiveDate,
    pub hours: f64,
    pub description: String,
}

impl NewEntry {
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            category: self.category,
            date: self.date,
            hours: self.hours,
            description: self.description,
        }
    }
}
