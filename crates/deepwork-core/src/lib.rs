//! # deepwork Core Library
//!
//! Time-tracking engine for a single user on a single device: a bounded
//! focus countdown, an open-ended deep-work stopwatch, and the per-day ledger
//! the stopwatch commits into.
//!
//! ## Architecture
//!
//! - **Engines** are plain structs injected with a [`StateStore`] and a
//!   [`Clock`]. They keep instants, not counters, so time spent while the
//!   process was suspended or restarted is recovered on the next read.
//! - **Polling** is the caller's job: [`PollLoop`] reconciles an engine on a
//!   fixed cadence, but every engine also works when polled by hand.
//! - **Storage**: SQLite key-value records and TOML configuration.
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: focus session state machine
//! - [`StopwatchEngine`]: accumulator with day commit
//! - [`DailyLedger`] / [`WeeklyView`]: committed minutes and the weekly summary
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod hooks;
pub mod ledger;
pub mod poll;
pub mod stopwatch;
pub mod storage;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, HookError, StoreError};
pub use events::Event;
pub use hooks::{CompletionHook, CountingHook};
pub use ledger::{DailyLedger, DayTotal, WeeklyView};
pub use poll::{PollLoop, PollSlot, Pollable, DEFAULT_POLL_INTERVAL};
pub use stopwatch::{StopwatchEngine, StopwatchSnapshot};
pub use storage::{Config, CountdownSettings};
pub use store::{MemoryStore, SqliteStore, StateStore, StoreExt};
pub use timer::{CountdownEngine, CountdownSnapshot, TimerState};
