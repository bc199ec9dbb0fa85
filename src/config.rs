use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::preview::DuplicateDetection;

pub const ENV_SERVER_URL: &str = "MAPPING_CORE_SERVER_URL";
pub const ENV_TIMEOUT_SECS: &str = "MAPPING_CORE_TIMEOUT_SECS";
pub const ENV_DEBOUNCE_MS: &str = "MAPPING_CORE_DEBOUNCE_MS";
pub const ENV_DUPLICATE_DETECTION: &str = "MAPPING_CORE_DUPLICATE_DETECTION";

fn default_server_url() -> String {
    "http://localhost:8111".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    20
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub duplicate_detection: DuplicateDetection,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_url: default_server_url(),
            timeout_secs: default_timeout_secs(),
            debounce_ms: default_debounce_ms(),
            duplicate_detection: DuplicateDetection::Enabled,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable keys keep
    /// their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = AppConfig::default();

        if let Some(url) = lookup(ENV_SERVER_URL) {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                cfg.server_url = url.to_string();
            }
        }

        if let Some(v) = parsed::<u64>(&lookup, ENV_TIMEOUT_SECS) {
            cfg.timeout_secs = v;
        }

        if let Some(v) = parsed::<u64>(&lookup, ENV_DEBOUNCE_MS) {
            cfg.debounce_ms = v;
        }

        if let Some(v) = parsed::<bool>(&lookup, ENV_DUPLICATE_DETECTION) {
            cfg.duplicate_detection = v.into();
        }

        cfg
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable config value");
            None
        }
    }
}
