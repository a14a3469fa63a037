//! Terminal renditions of the countdown's completion alarm and notification.

use std::io::Write;

use deepwork_core::storage::NotificationsConfig;
use deepwork_core::{CompletionHook, HookError};

/// Audible alarm: the terminal bell.
pub struct TerminalBell;

impl CompletionHook for TerminalBell {
    fn name(&self) -> &str {
        "alarm"
    }

    fn on_countdown_complete(&self) -> Result<(), HookError> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|source| HookError::Io {
                hook: self.name().to_string(),
                source,
            })
    }
}

/// User notification printed to stderr.
pub struct Notice {
    title: String,
    body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl CompletionHook for Notice {
    fn name(&self) -> &str {
        "notification"
    }

    fn on_countdown_complete(&self) -> Result<(), HookError> {
        writeln!(std::io::stderr(), "{}: {}", self.title, self.body).map_err(|source| {
            HookError::Io {
                hook: self.name().to_string(),
                source,
            }
        })
    }
}

/// Hooks enabled by the notification settings.
pub fn from_config(cfg: &NotificationsConfig) -> Vec<Box<dyn CompletionHook>> {
    let mut hooks: Vec<Box<dyn CompletionHook>> = Vec::new();
    if !cfg.enabled {
        return hooks;
    }
    if cfg.bell {
        hooks.push(Box::new(TerminalBell));
    }
    hooks.push(Box::new(Notice::new(cfg.title.clone(), cfg.body.clone())));
    hooks
}
