//! Fallback for any environment that sets `CI`.

use super::{key_value_line, VARIABLE_PREFIX};
use crate::env::EnvSource;
use crate::server::{BuildServer, Result};

/// Applies alongside vendor detectors on most hosted runners.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericCi;

impl BuildServer for GenericCi {
    fn name(&self) -> &'static str {
        "GenericCi"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_truthy("CI")
    }

    fn generate_set_version_message(&self, semver: &str) -> Result<String> {
        Ok(format!("Set build version to {semver}"))
    }

    fn generate_set_parameter_message(&self, name: &str, value: &str) -> Result<Vec<String>> {
        Ok(vec![key_value_line(
            self.name(),
            &format!("{VARIABLE_PREFIX}.{name}"),
            value,
        )?])
    }
}
