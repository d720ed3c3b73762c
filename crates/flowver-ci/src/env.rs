//! Read-only view of environment variables used for CI detection.

use std::collections::HashMap;

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// Set to a non-blank value.
    fn is_set(&self, key: &str) -> bool {
        self.var(key).is_some_and(|v| !v.trim().is_empty())
    }

    /// Set to `true`, `1` or `yes` (case-insensitive).
    fn is_truthy(&self, key: &str) -> bool {
        self.var(key).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            )
        })
    }
}

/// The current process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, for tests and embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_truthy() {
        let env = MapEnv::new()
            .with("CI", "True")
            .with("BLANK", "  ")
            .with("NO", "false");
        assert!(env.is_set("CI"));
        assert!(env.is_truthy("CI"));
        assert!(!env.is_set("BLANK"));
        assert!(!env.is_truthy("NO"));
        assert!(!env.is_set("MISSING"));
    }

    #[test]
    fn collect_from_pairs() {
        let env: MapEnv = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.var("B").as_deref(), Some("2"));
    }
}
