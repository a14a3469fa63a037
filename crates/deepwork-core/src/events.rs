use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every externally visible state change produces an Event.
/// The CLI prints them; a GUI would render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        remaining_secs: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownExtended {
        added_secs: u64,
        remaining_secs: u64,
        state: TimerState,
        at: DateTime<Utc>,
    },
    CountdownDurationSet {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted once per completion edge.
    CountdownCompleted {
        at: DateTime<Utc>,
    },
    StopwatchStarted {
        accumulated_secs: u64,
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        accumulated_secs: u64,
        at: DateTime<Utc>,
    },
    /// The stopwatch total was folded into the daily ledger.
    DayCommitted {
        date: NaiveDate,
        minutes: u64,
        day_total_minutes: u64,
        discarded_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::CountdownStarted { at, .. }
            | Event::CountdownPaused { at, .. }
            | Event::CountdownReset { at, .. }
            | Event::CountdownExtended { at, .. }
            | Event::CountdownDurationSet { at, .. }
            | Event::CountdownCompleted { at }
            | Event::StopwatchStarted { at, .. }
            | Event::StopwatchPaused { at, .. }
            | Event::DayCommitted { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::utc_datetime;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::CountdownCompleted {
            at: utc_datetime(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CountdownCompleted");
    }

    #[test]
    fn day_committed_date_is_iso() {
        let event = Event::DayCommitted {
            date: NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
            minutes: 2,
            day_total_minutes: 42,
            discarded_secs: 5,
            at: utc_datetime(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["date"], "2024-10-07");
        assert_eq!(event.at(), utc_datetime(0));
    }
}
