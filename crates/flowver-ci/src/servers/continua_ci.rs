//! VSoft Continua CI.

use super::{escape_service_value, VARIABLE_PREFIX};
use crate::env::EnvSource;
use crate::server::{BuildServer, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct ContinuaCi;

impl BuildServer for ContinuaCi {
    fn name(&self) -> &'static str {
        "ContinuaCi"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_set("ContinuaCI.Version")
    }

    fn generate_set_version_message(&self, semver: &str) -> Result<String> {
        Ok(format!(
            "@@continua[setBuildVersion value='{}']",
            escape_service_value(semver)
        ))
    }

    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "@@continua[setVariable name='{VARIABLE_PREFIX}.{name}' value='{}']",
            escape_service_value(value)
        )])
    }
}
