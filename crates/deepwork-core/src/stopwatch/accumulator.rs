//! Deep-work stopwatch.
//!
//! Elapsed time is `accumulated_secs` plus the span since `start_ms` while a
//! session is active. Nothing is added per poll: the live value is derived
//! from the clock whenever it is read, so polling frequency cannot inflate or
//! lose time, and a restarted process picks up the stored start instant.

use serde::{Deserialize, Serialize};

use crate::clock::{utc_datetime, Clock};
use crate::events::Event;
use crate::ledger::{DailyLedger, WeeklyView};
use crate::store::{StateStore, StoreExt, STOPWATCH_KEY};

/// Persisted form of the stopwatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchRecord {
    #[serde(default)]
    pub accumulated_secs: u64,
    /// Start of the active session, present exactly while running.
    #[serde(default)]
    pub start_ms: Option<u64>,
}

/// Read-only view for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchSnapshot {
    /// Live total including the active session.
    pub elapsed_secs: u64,
    pub accumulated_secs: u64,
    pub running: bool,
}

/// Unbounded elapsed-time tracker feeding the daily ledger.
pub struct StopwatchEngine<S, C> {
    store: S,
    clock: C,
    accumulated_secs: u64,
    start_ms: Option<u64>,
}

impl<S: StateStore, C: Clock> StopwatchEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        let record: StopwatchRecord = store.get_or_default(STOPWATCH_KEY);
        Self {
            store,
            clock,
            accumulated_secs: record.accumulated_secs,
            start_ms: record.start_ms,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_ms.is_some()
    }

    pub fn accumulated_secs(&self) -> u64 {
        self.accumulated_secs
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    /// Live elapsed seconds right now.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs_at(self.clock.now_ms())
    }

    pub fn elapsed_secs_at(&self, now_ms: u64) -> u64 {
        self.accumulated_secs
            .saturating_add(self.active_secs_at(now_ms))
    }

    pub fn record(&self) -> StopwatchRecord {
        StopwatchRecord {
            accumulated_secs: self.accumulated_secs,
            start_ms: self.start_ms,
        }
    }

    pub fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            elapsed_secs: self.elapsed_secs(),
            accumulated_secs: self.accumulated_secs,
            running: self.is_running(),
        }
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        let now = self.clock.now_ms();
        self.start_ms = Some(now);
        self.persist();
        tracing::debug!(accumulated_secs = self.accumulated_secs, "stopwatch started");
        Some(Event::StopwatchStarted {
            accumulated_secs: self.accumulated_secs,
            at: utc_datetime(now),
        })
    }

    /// Fold the active span into `accumulated_secs`. Partial seconds of the
    /// span are dropped.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let now = self.clock.now_ms();
        self.accumulated_secs = self.elapsed_secs_at(now);
        self.start_ms = None;
        self.persist();
        tracing::debug!(accumulated_secs = self.accumulated_secs, "stopwatch paused");
        Some(Event::StopwatchPaused {
            accumulated_secs: self.accumulated_secs,
            at: utc_datetime(now),
        })
    }

    /// Add the whole minutes tracked so far to today's ledger entry and zero
    /// the stopwatch, stopping it if it was running. Sub-minute residue is
    /// discarded.
    ///
    /// If the ledger cannot be read or written the stopwatch is left untouched and
    /// `None` is returned, so the tracked time can be committed again later.
    pub fn commit_day(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let date = self.clock.today();
        let total = self.elapsed_secs_at(now);
        let minutes = total / 60;

        let mut ledger = match DailyLedger::try_load(&self.store) {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    %date,
                    minutes,
                    "failed to read ledger, keeping stopwatch"
                );
                return None;
            }
        };
        let day_total_minutes = ledger.record_minutes(date, minutes);
        if let Err(e) = ledger.save(&self.store) {
            tracing::error!(
                error = %e,
                %date,
                minutes,
                "failed to write ledger, keeping stopwatch"
            );
            return None;
        }

        self.accumulated_secs = 0;
        self.start_ms = None;
        self.persist();
        tracing::info!(%date, minutes, day_total_minutes, "day committed");
        Some(Event::DayCommitted {
            date,
            minutes,
            day_total_minutes,
            discarded_secs: total % 60,
            at: utc_datetime(now),
        })
    }

    /// The stopwatch has no time-driven transitions; polling only refreshes
    /// what a caller reads through [`Self::snapshot`].
    pub fn poll(&mut self) -> Option<Event> {
        None
    }

    /// Current ledger contents.
    pub fn ledger(&self) -> DailyLedger {
        DailyLedger::load(&self.store)
    }

    /// Weekly view for the week containing today.
    pub fn this_week(&self) -> WeeklyView {
        self.ledger().weekly_total(self.clock.today())
    }

    fn active_secs_at(&self, now_ms: u64) -> u64 {
        self.start_ms
            .map(|start| now_ms.saturating_sub(start) / 1000)
            .unwrap_or(0)
    }

    fn persist(&self) {
        if let Err(e) = self.store.put(STOPWATCH_KEY, &self.record()) {
            tracing::warn!(error = %e, "failed to persist stopwatch");
        }
    }
}
