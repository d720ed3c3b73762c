//! Built-in CI server integrations.

pub mod azure_pipelines;
pub mod continua_ci;
pub mod generic;
pub mod github_actions;
pub mod gitlab_ci;
pub mod jenkins;
pub mod teamcity;

pub use azure_pipelines::AzurePipelines;
pub use continua_ci::ContinuaCi;
pub use generic::GenericCi;
pub use github_actions::GitHubActions;
pub use gitlab_ci::GitLabCi;
pub use jenkins::Jenkins;
pub use teamcity::TeamCity;

use crate::server::{BuildServerError, Result};

/// Prefix of every published variable.
pub const VARIABLE_PREFIX: &str = "FlowVer";

/// `|`-escaping used by TeamCity and Continua service messages.
pub(crate) fn escape_service_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            other => out.push(other),
        }
    }
    out
}

/// `PreReleaseTag` -> `FLOWVER_PRE_RELEASE_TAG`
pub(crate) fn env_var_name(name: &str) -> String {
    let mut out = VARIABLE_PREFIX.to_ascii_uppercase();
    out.push('_');
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// `KEY=value` line; dotenv-style formats cannot carry line breaks.
pub(crate) fn key_value_line(server: &str, key: &str, value: &str) -> Result<String> {
    if value.contains(['\n', '\r']) {
        return Err(BuildServerError::Render {
            server: server.to_string(),
            what: "parameter",
            reason: format!("value of {key} spans multiple lines"),
        });
    }
    Ok(format!("{key}={value}"))
}
