//! JetBrains TeamCity.

use std::path::Path;

use async_trait::async_trait;
use flowver_core::GitCli;

use super::{escape_service_value, VARIABLE_PREFIX};
use crate::env::EnvSource;
use crate::server::{unshallow_if_needed, BuildServer, Result};

/// Detected through `TEAMCITY_VERSION`. Agent-side checkouts may be shallow.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeamCity;

#[async_trait]
impl BuildServer for TeamCity {
    fn name(&self) -> &'static str {
        "TeamCity"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_set("TEAMCITY_VERSION")
    }

    async fn perform_pre_processing(&self, git_dir: &Path, git: &GitCli) -> Result<()> {
        unshallow_if_needed(self.name(), git_dir, git).await
    }

    fn generate_set_version_message(&self, semver: &str) -> Result<String> {
        Ok(format!(
            "##teamcity[buildNumber '{}']",
            escape_service_value(semver)
        ))
    }

    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
        let value = escape_service_value(value);
        Ok(vec![
            format!("##teamcity[setParameter name='{VARIABLE_PREFIX}.{name}' value='{value}']"),
            format!(
                "##teamcity[setParameter name='system.{VARIABLE_PREFIX}.{name}' value='{value}']"
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    #[test]
    fn detects_teamcity_agent() {
        assert!(TeamCity.can_apply(&MapEnv::new().with("TEAMCITY_VERSION", "2024.1")));
        assert!(!TeamCity.can_apply(&MapEnv::new()));
    }

    #[test]
    fn build_number_message() {
        assert_eq!(
            TeamCity.generate_set_version_message("1.2.1-login.2").unwrap(),
            "##teamcity[buildNumber '1.2.1-login.2']"
        );
    }

    #[test]
    fn parameter_messages_include_system_variant() {
        let lines = TeamCity
            .generate_set_parameter_message("BranchName", "feature/it's")
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "##teamcity[setParameter name='FlowVer.BranchName' value='feature/it|'s']",
                "##teamcity[setParameter name='system.FlowVer.BranchName' value='feature/it|'s']",
            ]
        );
    }
}
