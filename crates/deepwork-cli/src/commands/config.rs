use clap::Subcommand;
use deepwork_core::Config;
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "countdown.default_minutes", "poll.interval_ms")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            print_json(&json!({ "key": key, "value": value }))
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key);
            print_json(&json!({ "key": key, "value": stored }))
        }
        ConfigAction::List => print_json(&Config::load()?),
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            print_json(&config)
        }
    }
}
