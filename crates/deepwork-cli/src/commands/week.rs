use deepwork_core::ledger::parse_date_key;
use deepwork_core::{Clock, DailyLedger, DayTotal, SqliteStore, SystemClock, WeeklyView};
use serde::Serialize;

use super::print_json;

#[derive(Serialize)]
struct WeekReport {
    #[serde(flatten)]
    view: WeeklyView,
    total: String,
    busiest_day: Option<DayTotal>,
}

pub fn run_week(date: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let reference = match date {
        Some(raw) => parse_date_key(raw)
            .ok_or_else(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?,
        None => SystemClock.today(),
    };

    let store = SqliteStore::open()?;
    let view = DailyLedger::load(&store).weekly_total(reference);
    let total = view.total_label();
    let busiest_day = view.busiest_day().cloned();
    print_json(&WeekReport {
        view,
        total,
        busiest_day,
    })
}

pub fn run_ledger() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    print_json(&DailyLedger::load(&store).snapshot())
}
