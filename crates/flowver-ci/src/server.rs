//! Contract every CI server integration satisfies.

use std::path::Path;

use async_trait::async_trait;
use flowver_core::{FlowverError, GitCli, VersionAndBranch};
use tracing::info;

use crate::env::EnvSource;

/// Errors raised by build server integrations.
#[derive(Debug, thiserror::Error)]
pub enum BuildServerError {
    #[error(transparent)]
    Git(#[from] FlowverError),

    #[error("{server} cannot render {what}: {reason}")]
    Render {
        server: String,
        what: &'static str,
        reason: String,
    },

    #[error("build server '{0}' is already registered")]
    DuplicateServer(String),
}

pub type Result<T> = std::result::Result<T, BuildServerError>;

/// A CI server integration. Stateless; identity is [`BuildServer::name`].
#[async_trait]
pub trait BuildServer: Send + Sync {
    /// Stable display name, unique within a catalog.
    fn name(&self) -> &'static str;

    /// Whether the current environment is this CI server. Pure read.
    fn can_apply(&self, env: &dyn EnvSource) -> bool;

    /// Repair the checkout before version resolution. Must be idempotent.
    async fn perform_pre_processing(&self, _git_dir: &Path, _git: &GitCli) -> Result<()> {
        Ok(())
    }

    /// Directive that sets the build's version label.
    fn generate_set_version_message(&self, semver: &str) -> Result<String>;

    /// Lines publishing one variable to later build steps.
    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>>;

    /// One or more lines per version variable, in variable order.
    fn generate_build_log_output_parameters(
        &self,
        version: &VersionAndBranch,
    ) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for variable in &version.variables() {
            lines.extend(self.generate_set_parameter_message(variable.name, &variable.value)?);
        }
        Ok(lines)
    }
}

/// Shared pre-processing for servers that check out shallow clones.
pub async fn unshallow_if_needed(server: &str, git_dir: &Path, git: &GitCli) -> Result<()> {
    if GitCli::is_shallow(git_dir) {
        info!(server, git_dir = %git_dir.display(), "Fetching full history of shallow clone");
        git.unshallow(git_dir).await?;
    }
    Ok(())
}

/// Set-version and parameter lines for one server, set-version first.
pub fn render_server_output(
    server: &dyn BuildServer,
    version: &VersionAndBranch,
) -> Result<Vec<String>> {
    let mut lines = vec![server.generate_set_version_message(&version.semver())?];
    lines.extend(server.generate_build_log_output_parameters(version)?);
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowver_core::{BranchType, SemanticVersion};

    struct Plain;

    impl BuildServer for Plain {
        fn name(&self) -> &'static str {
            "Plain"
        }

        fn can_apply(&self, _env: &dyn EnvSource) -> bool {
            true
        }

        fn generate_set_version_message(&self, semver: &str) -> Result<String> {
            Ok(format!("version {semver}"))
        }

        fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
            Ok(vec![format!("{name}={value}")])
        }
    }

    fn sample() -> VersionAndBranch {
        VersionAndBranch {
            branch_name: "develop".to_string(),
            branch_type: BranchType::Develop,
            sha: "f".repeat(40),
            commit_date: chrono::Utc::now(),
            version: SemanticVersion::new(1, 3, 0).with_pre_release("unstable", Some(4)),
        }
    }

    #[test]
    fn default_output_has_one_line_per_variable() {
        let version = sample();
        let lines = Plain.generate_build_log_output_parameters(&version).unwrap();
        assert_eq!(lines.len(), version.variables().len());
        assert_eq!(lines[0], "Major=1");
    }

    #[test]
    fn render_puts_set_version_first() {
        let lines = render_server_output(&Plain, &sample()).unwrap();
        assert_eq!(lines[0], "version 1.3.0-unstable.4");
        assert!(lines.contains(&"SemVer=1.3.0-unstable.4".to_string()));
    }

    #[tokio::test]
    async fn default_pre_processing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        Plain
            .perform_pre_processing(dir.path(), &GitCli::default())
            .await
            .unwrap();
    }
}
