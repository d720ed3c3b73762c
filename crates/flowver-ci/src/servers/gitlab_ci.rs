//! GitLab CI (dotenv report lines).

use std::path::Path;

use async_trait::async_trait;
use flowver_core::GitCli;

use super::{env_var_name, key_value_line};
use crate::env::EnvSource;
use crate::server::{unshallow_if_needed, BuildServer, Result};

/// Runners clone with a limited `GIT_DEPTH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitLabCi;

#[async_trait]
impl BuildServer for GitLabCi {
    fn name(&self) -> &'static str {
        "GitLabCi"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_set("GITLAB_CI")
    }

    async fn perform_pre_processing(&self, git_dir: &Path, git: &GitCli) -> Result<()> {
        unshallow_if_needed(self.name(), git_dir, git).await
    }

    fn generate_set_version_message(&self, semver: &str) -> Result<String> {
        Ok(format!("Set build version to {semver}"))
    }

    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
        Ok(vec![key_value_line(self.name(), &env_var_name(name), value)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    #[test]
    fn detection_and_lines() {
        assert!(GitLabCi.can_apply(&MapEnv::new().with("GITLAB_CI", "true")));
        assert!(!GitLabCi.can_apply(&MapEnv::new()));
        assert_eq!(
            GitLabCi.generate_set_parameter_message("FullSemVer", "1.0.0+abc").unwrap(),
            vec!["FLOWVER_FULL_SEM_VER=1.0.0+abc"]
        );
    }
}
