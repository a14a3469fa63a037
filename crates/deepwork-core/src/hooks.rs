//! Completion side effects.
//!
//! The countdown calls every registered hook once when it reaches zero. Hooks
//! are fire-and-forget: an error is logged and the next hook still runs, and
//! the state transition that triggered them has already been applied.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::HookError;

/// A side effect fired on the countdown's completion edge.
pub trait CompletionHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn on_countdown_complete(&self) -> Result<(), HookError>;
}

/// Run every hook, logging failures.
pub(crate) fn fire_all(hooks: &[Box<dyn CompletionHook>]) {
    for hook in hooks {
        match hook.on_countdown_complete() {
            Ok(()) => tracing::debug!(hook = hook.name(), "completion hook fired"),
            Err(e) => tracing::warn!(hook = hook.name(), error = %e, "completion hook failed"),
        }
    }
}

/// Counts invocations. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct CountingHook {
    fired: Arc<AtomicUsize>,
}

impl CountingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl CompletionHook for CountingHook {
    fn name(&self) -> &str {
        "counter"
    }

    fn on_countdown_complete(&self) -> Result<(), HookError> {
        self.fired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
