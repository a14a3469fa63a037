//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus session length and the countdown cap
//! - Poll cadence for the live loops
//! - Completion alarm and notification settings
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Focus session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_session_minutes")]
    pub default_minutes: u32,
    /// Upper bound for the remaining time. Falls back to `default_minutes`.
    #[serde(default)]
    pub cap_minutes: Option<u32>,
}

/// Poll loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

/// Completion side-effect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell as the audible alarm.
    #[serde(default = "default_true")]
    pub bell: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_body")]
    pub body: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Resolved countdown bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSettings {
    /// Duration restored by `reset()`.
    pub default_secs: u64,
    /// Maximum remaining time.
    pub cap_secs: u64,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self::from_minutes(default_session_minutes(), None)
    }
}

impl CountdownSettings {
    /// Build settings from minute values. The session length is at least one
    /// minute and never exceeds the cap.
    pub fn from_minutes(default_minutes: u32, cap_minutes: Option<u32>) -> Self {
        let default_secs = u64::from(default_minutes.max(1)) * 60;
        let cap_secs = cap_minutes
            .map(|m| u64::from(m.max(1)) * 60)
            .unwrap_or(default_secs);
        Self {
            default_secs: default_secs.min(cap_secs),
            cap_secs,
        }
    }
}

// Default functions
fn default_session_minutes() -> u32 {
    60
}
fn default_poll_interval_ms() -> u64 {
    200
}
fn default_true() -> bool {
    true
}
fn default_title() -> String {
    "Time's Up!".into()
}
fn default_body() -> String {
    "Your focus session has ended. Take a break!".into()
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_session_minutes(),
            cap_minutes: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
            title: default_title(),
            body: default_body(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let unset = matches!(value.trim(), "" | "none" | "null");
                let new_value = match existing {
                    // Clearing a scalar only survives decoding for optional fields.
                    serde_json::Value::Bool(_) | serde_json::Value::Number(_) if unset => {
                        serde_json::Value::Null
                    }
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    // Unset optional values take whatever shape parses.
                    serde_json::Value::Null if unset => serde_json::Value::Null,
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    pub fn countdown_settings(&self) -> CountdownSettings {
        CountdownSettings::from_minutes(self.countdown.default_minutes, self.countdown.cap_minutes)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll.interval_ms.max(10))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.countdown.default_minutes, 60);
        assert_eq!(parsed.poll.interval_ms, 200);
        assert!(parsed.countdown.cap_minutes.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[countdown]\ndefault_minutes = 25\n").unwrap();
        assert_eq!(parsed.countdown.default_minutes, 25);
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.poll.interval_ms, 200);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("countdown.default_minutes").as_deref(), Some("60"));
        assert_eq!(cfg.get("notifications.bell").as_deref(), Some("true"));
        assert_eq!(cfg.get("notifications.title").as_deref(), Some("Time's Up!"));
        assert!(cfg.get("countdown.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set_value("poll.interval_ms", "500").unwrap();
        assert_eq!(cfg.poll.interval_ms, 500);
    }

    #[test]
    fn set_value_fills_optional_cap() {
        let mut cfg = Config::default();
        cfg.set_value("countdown.cap_minutes", "90").unwrap();
        assert_eq!(cfg.countdown.cap_minutes, Some(90));
        cfg.set_value("countdown.cap_minutes", "none").unwrap();
        assert_eq!(cfg.countdown.cap_minutes, None);
    }

    #[test]
    fn set_value_cannot_clear_required_number() {
        let mut cfg = Config::default();
        let result = cfg.set_value("countdown.default_minutes", "none");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.countdown.default_minutes, 60);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.set_value("countdown.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_value_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.set_value("notifications.enabled", "not_a_bool");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert!(cfg.notifications.enabled);
    }

    #[test]
    fn countdown_settings_default_cap_is_session_length() {
        let settings = Config::default().countdown_settings();
        assert_eq!(settings.default_secs, 3600);
        assert_eq!(settings.cap_secs, 3600);
    }

    #[test]
    fn countdown_settings_session_never_exceeds_cap() {
        let settings = CountdownSettings::from_minutes(90, Some(45));
        assert_eq!(settings.cap_secs, 45 * 60);
        assert_eq!(settings.default_secs, 45 * 60);

        let settings = CountdownSettings::from_minutes(0, None);
        assert_eq!(settings.default_secs, 60);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.countdown.default_minutes, 60);
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "countdown = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
