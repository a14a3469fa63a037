//! Per-day deep-work minutes.
//!
//! The ledger maps a local calendar date to the minutes committed on it.
//! Commits add to the existing entry; nothing in the engine removes entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::weekly::WeeklyView;
use crate::error::StoreError;
use crate::store::{StateStore, StoreExt, LEDGER_KEY};

/// Format used for ledger keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Render a date as a ledger key (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a ledger key.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Mapping from date to committed minutes.
///
/// Serialized as a JSON object keyed by `YYYY-MM-DD`. Entries that fail to
/// parse on load are dropped individually so one bad value does not cost the
/// whole history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailyLedger {
    records: BTreeMap<NaiveDate, u64>,
}

impl<'de> Deserialize<'de> for DailyLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the ledger from `store`, empty if absent or unreadable.
    pub fn load<S: StateStore + ?Sized>(store: &S) -> Self {
        store.get_or_default(LEDGER_KEY)
    }

    /// Read the ledger from `store`, failing only when the store itself
    /// cannot be read. A missing or corrupt record is an empty ledger.
    ///
    /// Use this before writing the ledger back, so a transient read failure
    /// is never mistaken for an empty history.
    pub fn try_load<S: StateStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        match store.get_raw(LEDGER_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "corrupt ledger record, starting empty");
                Self::default()
            })),
            None => Ok(Self::default()),
        }
    }

    pub fn save<S: StateStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        store.put(LEDGER_KEY, self)
    }

    fn from_raw(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let mut ledger = Self::new();
        for (key, value) in raw {
            let Some(date) = parse_date_key(&key) else {
                tracing::warn!(key = %key, "dropping ledger entry with bad date key");
                continue;
            };
            let minutes = match value.as_u64() {
                Some(m) => m,
                None => match value.as_f64() {
                    Some(m) if m.is_finite() && m >= 0.0 => m.floor() as u64,
                    _ => {
                        tracing::warn!(
                            key = %key,
                            value = %value,
                            "dropping invalid ledger minutes"
                        );
                        continue;
                    }
                },
            };
            ledger.record_minutes(date, minutes);
        }
        ledger
    }

    /// Add `minutes` to the entry for `date`, creating it at 0 if absent.
    /// Returns the new total for that date.
    pub fn record_minutes(&mut self, date: NaiveDate, minutes: u64) -> u64 {
        let entry = self.records.entry(date).or_insert(0);
        *entry = entry.saturating_add(minutes);
        *entry
    }

    /// Minutes recorded on `date`, 0 if none.
    pub fn minutes_on(&self, date: NaiveDate) -> u64 {
        self.records.get(&date).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &BTreeMap<NaiveDate, u64> {
        &self.records
    }

    /// Snapshot keyed by `YYYY-MM-DD` strings.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.records
            .iter()
            .map(|(date, minutes)| (date_key(*date), *minutes))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_minutes(&self) -> u64 {
        self.records.values().fold(0u64, |acc, m| acc.saturating_add(*m))
    }

    /// The Monday-start week containing `reference`.
    pub fn weekly_total(&self, reference: NaiveDate) -> WeeklyView {
        WeeklyView::build(self, reference)
    }
}
