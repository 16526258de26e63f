//! Week partitioning around a configurable first weekday

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{PunchcardError, Result};

/// Format accepted by [`parse_day`]
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// First day of a reporting week as a weekday number, Monday = 0 .. Sunday = 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekStart(u8);

impl WeekStart {
    pub const MONDAY: WeekStart = WeekStart(0);
    pub const SUNDAY: WeekStart = WeekStart(6);

    pub fn new(number: u8) -> Result<Self> {
        if number > 6 {
            return Err(PunchcardError::Config(format!(
                "week start {} is not a valid day of the week (0-6, Monday is 0)",
                number
            )));
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        match self.0 {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    fn matches(self, day: NaiveDate) -> bool {
        day.weekday().num_days_from_monday() == u32::from(self.0)
    }
}

impl Default for WeekStart {
    fn default() -> Self {
        Self::MONDAY
    }
}

impl TryFrom<u8> for WeekStart {
    type Error = PunchcardError;

    fn try_from(number: u8) -> Result<Self> {
        Self::new(number)
    }
}

impl From<WeekStart> for u8 {
    fn from(start: WeekStart) -> Self {
        start.0
    }
}

/// Seven consecutive days, first one falling on the week start
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Week {
    days: Vec<NaiveDate>,
}

impl Week {
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn first(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.days[self.days.len() - 1]
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first() <= day && day <= self.last()
    }
}

/// Days from the start of the week up to and including `day`, ascending.
///
/// Walks back one day at a time, so at most six steps are taken. The walk
/// stops at `NaiveDate::MIN`, so only the first week chrono can represent
/// may come back without its week start.
pub fn partial_week(day: NaiveDate, week_start: WeekStart) -> Vec<NaiveDate> {
    let mut week = vec![day];
    let mut current = day;
    while !week_start.matches(current) {
        match current.pred_opt() {
            Some(previous) => current = previous,
            None => break,
        }
        week.push(current);
    }
    week.reverse();
    week
}

/// All seven days of the week that `day` falls in.
///
/// Fails with `InvalidArgument` when that week runs past either end of the
/// date range chrono supports.
pub fn full_week(day: NaiveDate, week_start: WeekStart) -> Result<Week> {
    let mut days = partial_week(day, week_start);
    if !week_start.matches(days[0]) {
        return Err(out_of_range(day));
    }
    while days.len() < 7 {
        let next = days[days.len() - 1]
            .succ_opt()
            .ok_or_else(|| out_of_range(day))?;
        days.push(next);
    }
    Ok(Week { days })
}

fn out_of_range(day: NaiveDate) -> PunchcardError {
    PunchcardError::InvalidArgument(format!(
        "the week around {} is out of the supported date range",
        day
    ))
}

/// Number of whole weeks, ending with `week`, that fit in the date range
fn weeks_available(week: &Week) -> usize {
    let days = week.first().signed_duration_since(NaiveDate::MIN).num_days();
    usize::try_from(days / 7 + 1).unwrap_or(usize::MAX)
}

/// `n_weeks` weeks ending with the week that `day` falls in, oldest first.
///
/// Unless `day` is the last day of its week, the final week reaches into
/// the days after it. Asking for more weeks than fit before `day` fails with
/// `InvalidArgument`.
pub fn recent_weeks(n_weeks: usize, day: NaiveDate, week_start: WeekStart) -> Result<Vec<Week>> {
    if n_weeks < 1 {
        return Err(PunchcardError::InvalidArgument(format!(
            "number of weeks must be at least 1, got {}",
            n_weeks
        )));
    }

    let mut current = full_week(day, week_start)?;
    let available = weeks_available(&current);
    if n_weeks > available {
        return Err(PunchcardError::InvalidArgument(format!(
            "{} weeks before {} is out of the supported date range (at most {})",
            n_weeks, day, available
        )));
    }

    let mut weeks = Vec::new();
    for _ in 1..n_weeks {
        // The last day of a week, one week back, is itself the last day of
        // its week, so the partial week is already complete.
        let previous_end = current
            .last()
            .checked_sub_days(Days::new(7))
            .ok_or_else(|| out_of_range(day))?;
        let previous = Week {
            days: partial_week(previous_end, week_start),
        };
        weeks.push(std::mem::replace(&mut current, previous));
    }
    weeks.push(current);
    weeks.reverse();
    Ok(weeks)
}

/// Parse a `YYYY-MM-DD` day
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
        .map_err(|e| PunchcardError::InvalidArgument(format!("invalid day '{}': {}", value, e)))
}
