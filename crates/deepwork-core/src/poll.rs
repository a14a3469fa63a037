//! Periodic reconciliation of an engine against the clock.
//!
//! The engines own all timing logic; this module only decides *when* to call
//! them. A poll locks the engine, reconciles, hands the result to the caller's
//! callback and releases the lock, so no two polls of one engine overlap.
//! Stopping is synchronous: once [`PollLoop::stop`] returns, any tick that was
//! already scheduled finds the cancel flag set and does nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::clock::Clock;
use crate::events::Event;
use crate::stopwatch::StopwatchEngine;
use crate::store::StateStore;
use crate::timer::CountdownEngine;

/// Default poll cadence. Finer than the one-second display so the shown
/// value never lags by a full second.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// An engine that can be reconciled against the clock.
pub trait Pollable: Send + 'static {
    /// Apply whatever transition the current instant calls for.
    fn reconcile(&mut self) -> Option<Event>;

    /// Whether the loop should keep polling.
    fn is_active(&self) -> bool;
}

impl<S, C> Pollable for CountdownEngine<S, C>
where
    S: StateStore + 'static,
    C: Clock + 'static,
{
    fn reconcile(&mut self) -> Option<Event> {
        self.poll()
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}

impl<S, C> Pollable for StopwatchEngine<S, C>
where
    S: StateStore + 'static,
    C: Clock + 'static,
{
    fn reconcile(&mut self) -> Option<Event> {
        self.poll()
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}

/// A running poll loop. Dropping it stops the loop.
pub struct PollLoop {
    handle: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl PollLoop {
    /// Spawn a loop polling `engine` every `interval` until the engine goes
    /// inactive or the loop is stopped.
    ///
    /// `on_poll` runs after every reconcile, still under the engine lock,
    /// with the event the reconcile produced (if any).
    pub fn spawn<E, F>(engine: Arc<Mutex<E>>, interval: Duration, mut on_poll: F) -> Self
    where
        E: Pollable,
        F: FnMut(&E, Option<Event>) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // A suspended process gets one catch-up poll, not a burst.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;

                let mut guard = engine.lock().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                let event = guard.reconcile();
                let active = guard.is_active();
                on_poll(&*guard, event);
                if !active {
                    tracing::debug!("engine inactive, poll loop exiting");
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
            cancelled,
        }
    }

    /// Stop polling. Safe to call any number of times.
    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait until the loop exits on its own.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "poll loop task failed");
                }
            }
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Holds at most one poll loop for an engine.
///
/// Starting a new loop stops the previous one first.
#[derive(Default)]
pub struct PollSlot {
    current: Option<PollLoop>,
}

impl PollSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<E, F>(&mut self, engine: Arc<Mutex<E>>, interval: Duration, on_poll: F)
    where
        E: Pollable,
        F: FnMut(&E, Option<Event>) + Send + 'static,
    {
        self.stop();
        self.current = Some(PollLoop::spawn(engine, interval, on_poll));
    }

    pub fn stop(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.current.as_ref().is_some_and(|l| !l.is_finished())
    }

    /// Take the running loop, e.g. to [`PollLoop::join`] it.
    pub fn take(&mut self) -> Option<PollLoop> {
        self.current.take()
    }
}
