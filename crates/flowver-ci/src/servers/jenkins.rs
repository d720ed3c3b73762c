//! Jenkins. Lines are meant for an env-inject properties file.

use super::{env_var_name, key_value_line};
use crate::env::EnvSource;
use crate::server::{BuildServer, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct Jenkins;

impl BuildServer for Jenkins {
    fn name(&self) -> &'static str {
        "Jenkins"
    }

    fn can_apply(&self, env: &dyn EnvSource) -> bool {
        env.is_set("JENKINS_URL")
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
        assert!(Jenkins.can_apply(&MapEnv::new().with("JENKINS_URL", "https://ci.example.com/")));
        assert_eq!(
            Jenkins.generate_set_parameter_message("Sha", "abc").unwrap(),
            vec!["FLOWVER_SHA=abc"]
        );
    }
}
