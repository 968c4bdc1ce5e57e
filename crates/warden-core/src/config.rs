//! Configuration for the ban subsystem
//!
//! Loaded from TOML, then overridden by `WARDEN_*` environment variables,
//! then validated.

use crate::errors::{WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "WARDEN_";

/// Names and lifetimes used by the local channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Key used by the cookie, local and session storage channels
    pub storage_key: String,
    /// Response-cache name
    pub cache_name: String,
    /// Virtual path of the cached marker response
    pub cache_path: String,
    /// Transactional store database name
    pub idb_name: String,
    /// Object store inside `idb_name`
    pub idb_store: String,
    /// Cookie lifetime in seconds
    pub cookie_max_age_secs: u64,
    /// Local storage key holding the signed-in username
    pub session_key: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            storage_key: "___h8_ban_lock___".to_string(),
            cache_name: "h8_ban_vault".to_string(),
            cache_path: "/__ban_marker__.json".to_string(),
            idb_name: "h8_ban_store".to_string(),
            idb_store: "flags".to_string(),
            cookie_max_age_secs: 5 * 365 * 24 * 60 * 60,
            session_key: "h8pedia_username".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Base URL of the remote database
    pub database_url: String,
    /// URL returning `{ "ip": "..." }`; empty disables origin lookup
    pub origin_lookup_url: String,
    /// Per-request timeout on native targets
    pub request_timeout_secs: u64,
    /// Reason used when a cached or indexed flag carries none
    pub default_reason: String,
    /// Local channel names
    pub channels: ChannelConfig,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            database_url: "https://h8pedia-default-rtdb.firebaseio.com/".to_string(),
            origin_lookup_url: "https://api.ipify.org?format=json".to_string(),
            request_timeout_secs: 10,
            default_reason: "Access Denied".to_string(),
            channels: ChannelConfig::default(),
        }
    }
}

impl WardenConfig {
    /// Parse TOML; missing fields keep their defaults
    pub fn from_toml_str(text: &str) -> WardenResult<Self> {
        let mut config: Self = toml::from_str(text)
            .map_err(|e| WardenError::config(format!("Invalid TOML: {e}")))?;
        config.normalize();
        Ok(config)
    }

    /// Load from a TOML file and apply environment overrides
    pub fn load_from_file(path: &Path) -> WardenResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WardenError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WARDEN_*` variables from the process environment
    pub fn merge_with_env(&mut self) -> WardenResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `WARDEN_*` overrides from an arbitrary variable source
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> WardenResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.into();
            match name {
                "DATABASE_URL" => self.database_url = value,
                "ORIGIN_LOOKUP_URL" => self.origin_lookup_url = value,
                "REQUEST_TIMEOUT_SECS" => {
                    self.request_timeout_secs = value.parse().map_err(|_| {
                        WardenError::config(format!("{key} must be an integer", key = key.as_ref()))
                    })?;
                }
                "DEFAULT_REASON" => self.default_reason = value,
                "STORAGE_KEY" => self.channels.storage_key = value,
                "CACHE_NAME" => self.channels.cache_name = value,
                "SESSION_KEY" => self.channels.session_key = value,
                // Unrelated WARDEN_* variables (e.g. WARDEN_LOG) are not config.
                _ => {}
            }
        }
        self.normalize();
        Ok(())
    }

    /// Check invariants the handlers rely on
    pub fn validate(&self) -> WardenResult<()> {
        if !(self.database_url.starts_with("https://") || self.database_url.starts_with("http://"))
        {
            return Err(WardenError::config(format!(
                "database_url must be an http(s) URL, got {:?}",
                self.database_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(WardenError::config("request_timeout_secs must be positive"));
        }
        let names = [
            ("storage_key", &self.channels.storage_key),
            ("cache_name", &self.channels.cache_name),
            ("cache_path", &self.channels.cache_path),
            ("idb_name", &self.channels.idb_name),
            ("idb_store", &self.channels.idb_store),
            ("session_key", &self.channels.session_key),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(WardenError::config(format!("channels.{field} must not be empty")));
            }
        }
        if self.default_reason.trim().is_empty() {
            return Err(WardenError::config("default_reason must not be empty"));
        }
        Ok(())
    }

    /// Whether origin lookup is enabled
    pub fn origin_lookup_enabled(&self) -> bool {
        !self.origin_lookup_url.trim().is_empty()
    }

    fn normalize(&mut self) {
        if !self.database_url.is_empty() && !self.database_url.ends_with('/') {
            self.database_url.push('/');
        }
    }
}
