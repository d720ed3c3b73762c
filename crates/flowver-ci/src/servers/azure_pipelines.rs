//! Azure Pipelines (`##vso` logging commands).

use std::path::Path;

use async_trait::async_trait;
use flowver_core::GitCli;

use super::VARIABLE_PREFIX;
use crate::env::EnvSource;
use crate::server::{unshallow_if_needed, BuildServer, Result};

/// Pipelines default to a shallow fetch, so history is restored first.
#[derive(Debug, Default, Clone, Copy)]
pub struct AzurePipelines;

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(';', "%3B").replace(']', "%5D")
}

#[async_trait]
impl BuildServer for AzurePipelines {
    fn name(&self) -> &'static str {
        "AzurePipelines"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_truthy("TF_BUILD")
    }

    async fn perform_pre_processing(&self, git_dir: &Path, git: &GitCli) -> Result<()> {
        unshallow_if_needed(self.name(), git_dir, git).await
    }

    fn generate_set_version_message(&self, semver: &str) -> Result<String> {
        Ok(format!(
            "##vso[build.updatebuildnumber]{}",
            escape_data(semver)
        ))
    }

    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "##vso[task.setvariable variable={};]{}",
            escape_property(&format!("{VARIABLE_PREFIX}.{name}")),
            escape_data(value)
        )])
    }
}
