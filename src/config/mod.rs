use crate::error::{Result, TesseraError};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Network host the listener binds to
pub const HOST: &str = "host";
/// Network port the listener binds to
pub const PORT: &str = "port";
/// Log verbosity: trace, debug, info, warn, error or none
pub const LOG_LEVEL: &str = "log level";
/// Directory served as static files when set
pub const PUBLIC_DIRECTORY: &str = "public directory";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration service
///
/// Shared key/value settings. Clones share the same store, so values set
/// through `$params` are visible to the application and vice versa.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every environment variable starting with `prefix`.
    ///
    /// `APP_LOG_LEVEL` with prefix `APP_` becomes `log level`.
    pub fn from_env(prefix: &str) -> Self {
        let service = Self::default();
        service.merge_env(env::vars(), prefix);
        service
    }

    fn merge_env<I>(&self, vars: I, prefix: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let key = stripped.to_lowercase().replace('_', " ");
                self.set(&key, &value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse the value under `key`, `None` when absent or unparsable.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparsable value for '{}': {}", key, raw);
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    pub fn host(&self) -> String {
        self.get_or(HOST, DEFAULT_HOST)
    }

    /// The `port` setting, [`DEFAULT_PORT`] when unset.
    pub fn port(&self) -> Result<u16> {
        match self.get(PORT) {
            None => Ok(DEFAULT_PORT),
            Some(raw) => raw.trim().parse().map_err(|_| {
                TesseraError::illegal_value(format!("'{}' is not a valid port", raw))
            }),
        }
    }
}
