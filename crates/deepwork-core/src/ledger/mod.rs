//! Daily ledger and weekly aggregation.
//!
//! The ledger is written only by the stopwatch's day commit; the weekly view
//! is a pure read over it.

mod daily;
mod weekly;

pub use daily::{date_key, parse_date_key, DailyLedger, DATE_KEY_FORMAT};
pub use weekly::{week_dates, week_start, DayTotal, WeeklyView};
