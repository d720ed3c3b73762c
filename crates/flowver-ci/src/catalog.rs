//! Ordered registry of build server integrations.

use std::sync::Arc;

use crate::env::EnvSource;
use crate::server::{BuildServer, BuildServerError, Result};
use crate::servers;

/// Ordered set of integrations; names are unique.
#[derive(Clone)]
pub struct BuildServerCatalog {
    servers: Vec<Arc<dyn BuildServer>>,
}

impl BuildServerCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self {
            servers: Vec::new(),
        }
    }

    /// Catalog of the built-in integrations, vendor detectors before the generic one.
    pub fn with_defaults() -> Self {
        let defaults: [Arc<dyn BuildServer>; 7] = [
            Arc::new(servers::ContinuaCi),
            Arc::new(servers::TeamCity),
            Arc::new(servers::AzurePipelines),
            Arc::new(servers::GitHubActions),
            Arc::new(servers::GitLabCi),
            Arc::new(servers::Jenkins),
            Arc::new(servers::GenericCi),
        ];
        Self {
            servers: defaults.into(),
        }
    }

    /// Build a catalog from an explicit list, rejecting duplicate names.
    pub fn from_servers(servers: impl IntoIterator<Item = Arc<dyn BuildServer>>) -> Result<Self> {
        let mut catalog = Self::new();
        for server in servers {
            catalog.register(server)?;
        }
        Ok(catalog)
    }

    /// Append an integration after the existing ones.
    pub fn register(&mut self, server: Arc<dyn BuildServer>) -> Result<()> {
        if self.get(server.name()).is_some() {
            return Err(BuildServerError::DuplicateServer(server.name().to_string()));
        }
        self.servers.push(server);
        Ok(())
    }

    pub fn servers(&self) -> &[Arc<dyn BuildServer>] {
        &self.servers
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.servers.iter().map(|s| s.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BuildServer>> {
        self.servers.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Every integration whose detector matches `env`, in catalog order.
    ///
    /// Each detector is evaluated exactly once.
    pub fn select_applicable(&self, env: &dyn EnvSource) -> Vec<Arc<dyn BuildServer>> {
        self.servers
            .iter()
            .filter(|s| s.can_apply(env))
            .cloned()
            .collect()
    }
}

impl Default for BuildServerCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        name: &'static str,
        applies: bool,
        calls: AtomicUsize,
    }

    impl Probe {
        fn new(name: &'static str, applies: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                applies,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl BuildServer for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_apply(&self, _env: &dyn EnvSource) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.applies
        }

        fn generate_set_version_message(&self, semver: &str) -> Result<String> {
            Ok(semver.to_string())
        }

        fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
            Ok(vec![format!("{name}={value}")])
        }
    }

    #[test]
    fn defaults_are_ordered() {
        let catalog = BuildServerCatalog::with_defaults();
        assert_eq!(
            catalog.names(),
            vec![
                "ContinuaCi",
                "TeamCity",
                "AzurePipelines",
                "GitHubActions",
                "GitLabCi",
                "Jenkins",
                "GenericCi",
            ]
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut catalog = BuildServerCatalog::with_defaults();
        let err = catalog.register(Arc::new(servers::Jenkins)).unwrap_err();
        assert!(matches!(err, BuildServerError::DuplicateServer(name) if name == "Jenkins"));
        assert_eq!(catalog.len(), 7);
    }

    #[test]
    fn selection_preserves_order_and_asks_once() {
        let a = Probe::new("A", true);
        let b = Probe::new("B", false);
        let c = Probe::new("C", true);
        let catalog = BuildServerCatalog::from_servers([
            a.clone() as Arc<dyn BuildServer>,
            b.clone(),
            c.clone(),
        ])
        .unwrap();

        let selected = catalog.select_applicable(&MapEnv::new());
        let names: Vec<_> = selected.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
        for probe in [&a, &b, &c] {
            assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn github_runner_selects_vendor_and_generic() {
        let env = MapEnv::new()
            .with("GITHUB_ACTIONS", "true")
            .with("CI", "true");
        let selected = BuildServerCatalog::default().select_applicable(&env);
        let names: Vec<_> = selected.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["GitHubActions", "GenericCi"]);
    }

    #[test]
    fn empty_environment_selects_nothing() {
        assert!(BuildServerCatalog::default()
            .select_applicable(&MapEnv::new())
            .is_empty());
    }
}
