//! Weekly summary over the daily ledger.
//!
//! Weeks start on Monday. The view is recomputed from the ledger on every
//! call and never written back.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::daily::DailyLedger;
use crate::format::format_hours_minutes;

/// One day of the weekly view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    /// Short weekday name, `Mon` .. `Sun`.
    pub weekday: String,
    pub minutes: u64,
    /// Whether this is the reference date the week was built around.
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyView {
    pub reference: NaiveDate,
    /// Monday through Sunday, in order.
    pub days: Vec<DayTotal>,
    pub total_minutes: u64,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// The seven dates of the Monday-start week containing `date`.
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(date).iter_days().take(7).collect()
}

impl WeeklyView {
    pub fn build(ledger: &DailyLedger, reference: NaiveDate) -> Self {
        let days: Vec<DayTotal> = week_dates(reference)
            .into_iter()
            .map(|date| DayTotal {
                date,
                weekday: date.format("%a").to_string(),
                minutes: ledger.minutes_on(date),
                is_today: date == reference,
            })
            .collect();
        let total_minutes = days.iter().fold(0u64, |acc, d| acc.saturating_add(d.minutes));
        Self {
            reference,
            days,
            total_minutes,
        }
    }

    /// Total rendered as `Xh Ym`.
    pub fn total_label(&self) -> String {
        format_hours_minutes(self.total_minutes)
    }

    /// The day with the most minutes, `None` for an empty week.
    pub fn busiest_day(&self) -> Option<&DayTotal> {
        self.days
            .iter()
            .filter(|d| d.minutes > 0)
            .fold(None, |best: Option<&DayTotal>, d| match best {
                Some(b) if b.minutes >= d.minutes => Some(b),
                _ => Some(d),
            })
    }
}
