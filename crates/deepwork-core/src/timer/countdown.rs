//! Countdown engine implementation.
//!
//! The countdown is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `poll()`
//! periodically (see [`crate::poll::PollLoop`]).
//!
//! While running, the engine stores the instant the session ends rather than a
//! decrementing counter. Each poll recomputes the remaining time from that
//! instant, so a poll delayed by a sleeping laptop or a suspended process
//! lands on the correct value instead of losing the missed ticks.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Finished -> Idle (reset)
//!                                             Finished -> Paused (extend)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(store, SystemClock, settings);
//! engine.start();
//! // In a loop:
//! engine.poll(); // Returns Some(Event::CountdownCompleted) once at zero
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::{utc_datetime, Clock};
use crate::events::Event;
use crate::hooks::{fire_all, CompletionHook};
use crate::storage::CountdownSettings;
use crate::store::{StateStore, StoreExt, COUNTDOWN_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not started since the last reset or duration change.
    #[default]
    Idle,
    Running,
    Paused,
    /// Reached zero. Remaining time is pinned at 0 until extended or reset.
    Finished,
}

/// Persisted form of the countdown.
///
/// `end_ms` is present exactly when `state` is `Running`; in every other state
/// `remaining_secs` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownRecord {
    pub state: TimerState,
    pub remaining_secs: u64,
    #[serde(default)]
    pub end_ms: Option<u64>,
}

/// Read-only view for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub state: TimerState,
    pub remaining_secs: u64,
    pub running: bool,
    pub finished: bool,
    pub default_secs: u64,
    pub cap_secs: u64,
    /// 0.0 .. 1.0 of the default session already elapsed.
    pub progress: f64,
}

/// Bounded focus-session timer.
pub struct CountdownEngine<S, C> {
    store: S,
    clock: C,
    hooks: Vec<Box<dyn CompletionHook>>,
    settings: CountdownSettings,
    state: TimerState,
    remaining_secs: u64,
    end_ms: Option<u64>,
    /// Record last read from or written to the store by this engine.
    stored: Option<CountdownRecord>,
}

impl<S: StateStore, C: Clock> CountdownEngine<S, C> {
    /// Build an engine from whatever the store holds under the countdown key.
    ///
    /// A missing or corrupt record starts a fresh idle session of the default
    /// duration. A running record keeps its end instant, so the first poll
    /// after a restart catches up on the time spent while the process was gone.
    pub fn new(store: S, clock: C, settings: CountdownSettings) -> Self {
        let record: Option<CountdownRecord> = store.get_or_default(COUNTDOWN_KEY);
        let mut engine = Self {
            store,
            clock,
            hooks: Vec::new(),
            settings,
            state: TimerState::Idle,
            remaining_secs: settings.default_secs,
            end_ms: None,
            stored: record.clone(),
        };
        if let Some(record) = record {
            engine.restore(record);
        }
        engine
    }

    /// Register a completion side effect.
    pub fn with_hook(mut self, hook: impl CompletionHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn add_hook(&mut self, hook: Box<dyn CompletionHook>) {
        self.hooks.push(hook);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    /// Remaining seconds as of the last transition or poll.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Remaining seconds at `now_ms` without applying any transition.
    pub fn remaining_secs_at(&self, now_ms: u64) -> u64 {
        match (self.state, self.end_ms) {
            (TimerState::Running, Some(end)) => {
                ceil_secs(end.saturating_sub(now_ms)).min(self.settings.cap_secs)
            }
            _ => self.remaining_secs,
        }
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.end_ms
    }

    pub fn settings(&self) -> CountdownSettings {
        self.settings
    }

    pub fn record(&self) -> CountdownRecord {
        CountdownRecord {
            state: self.state,
            remaining_secs: self.remaining_secs,
            end_ms: self.end_ms,
        }
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        let remaining_secs = self.remaining_secs_at(self.clock.now_ms());
        let default = self.settings.default_secs;
        let progress = if default == 0 {
            0.0
        } else {
            (1.0 - remaining_secs as f64 / default as f64).clamp(0.0, 1.0)
        };
        CountdownSnapshot {
            state: self.state,
            remaining_secs,
            running: self.is_running(),
            finished: self.is_finished(),
            default_secs: default,
            cap_secs: self.settings.cap_secs,
            progress,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. No-op while running.
    ///
    /// Starting with nothing left is allowed; the next poll completes it.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        let now = self.clock.now_ms();
        let end = now.saturating_add(self.remaining_secs.saturating_mul(1000));
        self.state = TimerState::Running;
        self.end_ms = Some(end);
        self.persist();
        tracing::debug!(remaining_secs = self.remaining_secs, "countdown started");
        Some(Event::CountdownStarted {
            remaining_secs: self.remaining_secs,
            ends_at: utc_datetime(end),
            at: utc_datetime(now),
        })
    }

    /// Freeze the remaining time. If the end instant already passed, the
    /// pending completion is applied instead and its event returned.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let now = self.clock.now_ms();
        if let Some(completed) = self.poll_at(now) {
            return Some(completed);
        }
        self.remaining_secs = self.remaining_secs_at(now);
        self.state = TimerState::Paused;
        self.end_ms = None;
        self.persist();
        tracing::debug!(remaining_secs = self.remaining_secs, "countdown paused");
        Some(Event::CountdownPaused {
            remaining_secs: self.remaining_secs,
            at: utc_datetime(now),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.settings.default_secs;
        self.end_ms = None;
        self.persist();
        tracing::debug!("countdown reset");
        Some(Event::CountdownReset {
            remaining_secs: self.remaining_secs,
            at: utc_datetime(self.clock.now_ms()),
        })
    }

    /// Add time, clamped so the remaining time never exceeds the cap.
    ///
    /// Negative or NaN minutes add nothing and infinite minutes fill up to the
    /// cap. A finished countdown becomes paused and can be started again.
    pub fn extend(&mut self, minutes: f64) -> Option<Event> {
        let cap = self.settings.cap_secs;
        let added = minutes_to_secs(minutes, cap);
        let now = self.clock.now_ms();
        // Apply a completion that is already due before adding time to it.
        let completed = self.poll_at(now).is_some();

        let before = self.remaining_secs_at(now);
        match (self.state, self.end_ms) {
            (TimerState::Running, Some(end)) => {
                let live_ms = end.saturating_sub(now);
                let new_ms = live_ms
                    .saturating_add(added.saturating_mul(1000))
                    .min(cap.saturating_mul(1000));
                self.end_ms = Some(now.saturating_add(new_ms));
                self.remaining_secs = ceil_secs(new_ms);
            }
            _ => {
                self.remaining_secs = self.remaining_secs.saturating_add(added).min(cap);
                if self.state == TimerState::Finished {
                    self.state = TimerState::Paused;
                }
            }
        }
        self.persist();
        tracing::debug!(
            added_secs = added,
            remaining_secs = self.remaining_secs,
            completed,
            "countdown extended"
        );
        Some(Event::CountdownExtended {
            added_secs: self.remaining_secs.saturating_sub(before),
            remaining_secs: self.remaining_secs,
            state: self.state,
            at: utc_datetime(now),
        })
    }

    /// Replace the session length. Stops a running countdown.
    pub fn set_duration(&mut self, minutes: f64) -> Option<Event> {
        self.remaining_secs = minutes_to_secs(minutes, self.settings.cap_secs);
        self.state = TimerState::Idle;
        self.end_ms = None;
        self.persist();
        tracing::debug!(remaining_secs = self.remaining_secs, "countdown duration set");
        Some(Event::CountdownDurationSet {
            remaining_secs: self.remaining_secs,
            at: utc_datetime(self.clock.now_ms()),
        })
    }

    /// Pick up the stored record if another owner changed it since this
    /// engine last read or wrote it. Returns `true` when state was replaced.
    ///
    /// Read failures and corrupt records leave the in-memory state alone.
    pub fn sync(&mut self) -> bool {
        let json = match self.store.get_raw(COUNTDOWN_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!(error = %e, "countdown sync skipped");
                return false;
            }
        };
        let Ok(record) = serde_json::from_str::<CountdownRecord>(&json) else {
            return false;
        };
        if self.stored.as_ref() == Some(&record) {
            return false;
        }
        tracing::info!(state = ?record.state, "countdown changed elsewhere, reloading");
        self.stored = Some(record.clone());
        self.restore(record);
        true
    }

    /// Sync with the store, then reconcile against the clock. Call
    /// periodically.
    pub fn poll(&mut self) -> Option<Event> {
        self.sync();
        let now = self.clock.now_ms();
        self.poll_at(now)
    }

    /// Reconcile against `now_ms`. Returns `Some(Event::CountdownCompleted)`
    /// on the poll that observes the end instant; later polls are no-ops
    /// because the countdown is no longer running.
    pub fn poll_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let Some(end) = self.end_ms else {
            tracing::warn!("running countdown without end instant, pausing");
            self.state = TimerState::Paused;
            self.persist();
            return None;
        };

        if now_ms >= end {
            self.remaining_secs = 0;
            self.state = TimerState::Finished;
            self.end_ms = None;
            self.persist();
            tracing::info!(late_ms = now_ms - end, "countdown completed");
            fire_all(&self.hooks);
            return Some(Event::CountdownCompleted {
                at: utc_datetime(now_ms),
            });
        }

        // A wall clock stepped backwards must not stretch the session past
        // the cap.
        let cap_ms = self.settings.cap_secs.saturating_mul(1000);
        if end - now_ms > cap_ms {
            tracing::warn!(
                ahead_ms = end - now_ms - cap_ms,
                "clock moved backwards, clamping end"
            );
            self.end_ms = Some(now_ms + cap_ms);
            self.persist();
        }
        self.remaining_secs = self.remaining_secs_at(now_ms);
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restore(&mut self, record: CountdownRecord) {
        let cap = self.settings.cap_secs;
        self.state = record.state;
        self.remaining_secs = record.remaining_secs.min(cap);
        self.end_ms = record.end_ms;

        match self.state {
            TimerState::Running => match self.end_ms {
                Some(end) => {
                    // A lowered cap also bounds a session that is in flight.
                    let now = self.clock.now_ms();
                    let max_end = now.saturating_add(cap.saturating_mul(1000));
                    self.end_ms = Some(end.min(max_end));
                }
                None => {
                    tracing::warn!("stored countdown was running without end instant");
                    self.state = TimerState::Paused;
                }
            },
            TimerState::Finished => {
                self.remaining_secs = 0;
                self.end_ms = None;
            }
            TimerState::Idle | TimerState::Paused => self.end_ms = None,
        }
    }

    fn persist(&mut self) {
        let record = self.record();
        match self.store.put(COUNTDOWN_KEY, &record) {
            Ok(()) => self.stored = Some(record),
            Err(e) => tracing::warn!(error = %e, "failed to persist countdown"),
        }
    }
}

fn ceil_secs(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

/// Convert user-supplied minutes to whole seconds within `0..=cap`.
pub fn minutes_to_secs(minutes: f64, cap: u64) -> u64 {
    if minutes.is_nan() || minutes <= 0.0 {
        return 0;
    }
    let secs = minutes * 60.0;
    if !secs.is_finite() || secs >= cap as f64 {
        return cap;
    }
    secs.round() as u64
}
