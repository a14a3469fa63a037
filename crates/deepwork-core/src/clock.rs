//! Wall-clock capability consumed by the engines.
//!
//! Engines never count their own polls: every transition reads the clock and
//! works on the delta between two instants, so a suspended process catches up
//! on the next read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Local calendar date of `now_ms`, used as the ledger date key.
    fn today(&self) -> NaiveDate {
        local_date(self.now_ms())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A hand-driven clock for tests and replays.
///
/// Clones share the same instant, so a test can keep one handle and move time
/// while an engine owns the other. Dates are bucketed in UTC to keep results
/// independent of the machine's time zone.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// Start at midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        let ms = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis().max(0) as u64)
            .unwrap_or(0);
        Self::new(ms)
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        utc_datetime(self.now_ms()).date_naive()
    }
}

/// Convert epoch milliseconds into a UTC timestamp for events.
pub fn utc_datetime(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Local calendar date of an epoch-millisecond instant.
pub fn local_date(ms: u64) -> NaiveDate {
    match Local.timestamp_millis_opt(ms as i64) {
        chrono::LocalResult::Single(dt) => dt.date_naive(),
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.date_naive(),
        chrono::LocalResult::None => utc_datetime(ms).date_naive(),
    }
}
