//! GitHub Actions (workflow commands and `$GITHUB_ENV` lines).

use std::path::Path;

use async_trait::async_trait;
use flowver_core::GitCli;

use super::{key_value_line, VARIABLE_PREFIX};
use crate::env::EnvSource;
use crate::server::{unshallow_if_needed, BuildServer, Result};

/// `actions/checkout` fetches one commit by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHubActions;

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[async_trait]
impl BuildServer for GitHubActions {
    fn name(&self) -> &'static str {
        "GitHubActions"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_truthy("GITHUB_ACTIONS")
    }

    async fn perform_pre_processing(&self, git_dir: &Path, git: &GitCli) -> Result<()> {
        unshallow_if_needed(self.name(), git_dir, git).await
    }

    fn generate_set_version_message(&self, semver: &str) -> Result<String> {
        Ok(format!(
            "::notice title={VARIABLE_PREFIX}::Version {}",
            escape_data(semver)
        ))
    }

    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
        Ok(vec![key_value_line(
            self.name(),
            &format!("{VARIABLE_PREFIX}_{name}"),
            value,
        )?])
    }
}
