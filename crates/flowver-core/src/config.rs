//! Runtime configuration.
//!
//! Values come from the environment (`FLOWVER_*`) with built-in defaults.
//! Hosts may override individual fields afterwards.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Name of the tool's directory under the system temp dir.
pub const TEMP_DIR_NAME: &str = "FlowVer";

pub const DEFAULT_TEMP_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowverConfig {
    /// Directory holding generated version fragments.
    pub temp_dir: PathBuf,

    /// Generated fragments younger than this survive cleanup.
    pub temp_retention: Duration,

    /// Upper bound for each git command.
    pub git_timeout: Duration,
}

impl Default for FlowverConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join(TEMP_DIR_NAME),
            temp_retention: DEFAULT_TEMP_RETENTION,
            git_timeout: DEFAULT_GIT_TIMEOUT,
        }
    }
}

impl FlowverConfig {
    /// Build a configuration from the process environment.
    ///
    /// - `FLOWVER_TEMP_DIR`
    /// - `FLOWVER_TEMP_RETENTION_SECS`
    /// - `FLOWVER_GIT_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`FlowverConfig::from_env`] with an explicit variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("FLOWVER_TEMP_DIR").filter(|d| !d.trim().is_empty()) {
            config.temp_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_secs(&lookup, "FLOWVER_TEMP_RETENTION_SECS") {
            config.temp_retention = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "FLOWVER_GIT_TIMEOUT_SECS") {
            config.git_timeout = secs;
        }
        config
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}
