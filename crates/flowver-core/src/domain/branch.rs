//! GitFlow branch classification.

use serde::{Deserialize, Serialize};

/// Role of a branch under GitFlow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BranchType {
    /// `main` or `master`
    Mainline,

    /// `develop`
    Develop,

    /// `release/1.2.0`, `release-1.2`
    Release,

    /// `hotfix/1.2.1`
    Hotfix,

    /// `feature/login`
    Feature,

    /// `pull/42`, `merge-requests/7`
    PullRequest,

    /// Anything else, including a detached HEAD.
    Unknown,
}

const RELEASE_PREFIXES: &[&str] = &["release/", "releases/", "release-"];
const HOTFIX_PREFIXES: &[&str] = &["hotfix/", "hotfixes/", "hotfix-"];
const FEATURE_PREFIXES: &[&str] = &["feature/", "features/", "feature-"];
const PULL_REQUEST_PREFIXES: &[&str] = &["pull/", "pull-requests/", "pr/", "merge-requests/"];

impl BranchType {
    /// Classify a branch name. Remote and `refs/heads/` prefixes are ignored.
    pub fn classify(branch_name: &str) -> Self {
        let name = normalize_branch_name(branch_name).to_ascii_lowercase();
        match name.as_str() {
            "main" | "master" => return BranchType::Mainline,
            "develop" | "development" | "dev" => return BranchType::Develop,
            _ => {}
        }
        if has_prefix(&name, RELEASE_PREFIXES) {
            BranchType::Release
        } else if has_prefix(&name, HOTFIX_PREFIXES) {
            BranchType::Hotfix
        } else if has_prefix(&name, FEATURE_PREFIXES) {
            BranchType::Feature
        } else if has_prefix(&name, PULL_REQUEST_PREFIXES) {
            BranchType::PullRequest
        } else {
            BranchType::Unknown
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BranchType::Mainline => "mainline",
            BranchType::Develop => "develop",
            BranchType::Release => "release",
            BranchType::Hotfix => "hotfix",
            BranchType::Feature => "feature",
            BranchType::PullRequest => "pull_request",
            BranchType::Unknown => "unknown",
        }
    }
}

/// Strip `refs/heads/`, `refs/remotes/origin/` and `origin/` prefixes.
pub fn normalize_branch_name(branch_name: &str) -> &str {
    let name = branch_name.trim();
    let name = name.strip_prefix("refs/heads/").unwrap_or(name);
    let name = name.strip_prefix("refs/remotes/").unwrap_or(name);
    name.strip_prefix("origin/").unwrap_or(name)
}

/// The part of a typed branch name after its role prefix
/// (`feature/login` -> `login`). Untyped names are returned whole.
pub fn branch_suffix(branch_name: &str) -> &str {
    let name = normalize_branch_name(branch_name);
    let lower = name.to_ascii_lowercase();
    for prefix in RELEASE_PREFIXES
        .iter()
        .chain(HOTFIX_PREFIXES)
        .chain(FEATURE_PREFIXES)
        .chain(PULL_REQUEST_PREFIXES)
    {
        if lower.starts_with(prefix) {
            return &name[prefix.len()..];
        }
    }
    name
}

/// Make a branch fragment usable as a semver pre-release label.
pub fn sanitize_label(raw: &str) -> String {
    let mut label = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            label.push(c);
        } else if !label.ends_with('-') {
            label.push('-');
        }
    }
    label.trim_matches('-').to_string()
}

fn has_prefix(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_gitflow_branches() {
        assert_eq!(BranchType::classify("main"), BranchType::Mainline);
        assert_eq!(BranchType::classify("master"), BranchType::Mainline);
        assert_eq!(BranchType::classify("develop"), BranchType::Develop);
        assert_eq!(BranchType::classify("release/1.3.0"), BranchType::Release);
        assert_eq!(BranchType::classify("release-1.3"), BranchType::Release);
        assert_eq!(BranchType::classify("hotfix/1.2.1"), BranchType::Hotfix);
        assert_eq!(BranchType::classify("feature/login"), BranchType::Feature);
        assert_eq!(BranchType::classify("pull/42"), BranchType::PullRequest);
        assert_eq!(BranchType::classify("merge-requests/7"), BranchType::PullRequest);
        assert_eq!(BranchType::classify("spike"), BranchType::Unknown);
        assert_eq!(BranchType::classify("HEAD"), BranchType::Unknown);
    }

    #[test]
    fn classify_ignores_ref_prefixes_and_case() {
        assert_eq!(
            BranchType::classify("refs/heads/Feature/Login"),
            BranchType::Feature
        );
        assert_eq!(BranchType::classify("origin/develop"), BranchType::Develop);
    }

    #[test]
    fn suffix_of_typed_branches() {
        assert_eq!(branch_suffix("feature/login"), "login");
        assert_eq!(branch_suffix("release/1.3.0"), "1.3.0");
        assert_eq!(branch_suffix("pull/42"), "42");
        assert_eq!(branch_suffix("spike"), "spike");
    }

    #[test]
    fn sanitize_collapses_separators() {
        assert_eq!(sanitize_label("JIRA-12_add login"), "JIRA-12-add-login");
        assert_eq!(sanitize_label("users/bob/x"), "users-bob-x");
        assert_eq!(sanitize_label("__"), "");
    }
}
