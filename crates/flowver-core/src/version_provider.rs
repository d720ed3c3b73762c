//! Version resolution boundary and the default GitFlow provider.
//!
//! The pipeline only depends on [`VersionProvider`]. [`GitVersionProvider`]
//! derives a version from the latest reachable release tag, the commit
//! distance to it and the role of the current branch.

use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::domain::branch::{branch_suffix, sanitize_label, BranchType};
use crate::domain::error::Result;
use crate::domain::version::{SemanticVersion, VersionAndBranch};
use crate::git::GitCli;

/// Version used when no release tag is reachable.
pub const DEFAULT_BASE_VERSION: SemanticVersion = SemanticVersion {
    major: 0,
    minor: 1,
    patch: 0,
    pre_release: None,
    build_metadata: None,
};

/// Length of the abbreviated sha used as build metadata.
const SHORT_SHA_LEN: usize = 7;

/// Resolves the version for a repository.
///
/// Implementations must be deterministic for a fixed repository HEAD.
#[async_trait]
pub trait VersionProvider: Send + Sync {
    async fn resolve(&self, git_dir: &Path) -> Result<VersionAndBranch>;
}

/// GitFlow version provider backed by the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitVersionProvider {
    git: GitCli,
}

impl GitVersionProvider {
    pub fn new(git: GitCli) -> Self {
        Self { git }
    }

    /// Highest reachable release tag and the number of commits since it.
    async fn base_version(&self, git_dir: &Path) -> Result<(SemanticVersion, u64)> {
        let tags = self.git.merged_tags(git_dir).await?;
        let latest = tags
            .iter()
            .filter_map(|tag| SemanticVersion::parse_tag(tag).map(|v| (v, tag)))
            .max_by_key(|(v, _)| (v.major, v.minor, v.patch));

        match latest {
            Some((version, tag)) => {
                let distance = self
                    .git
                    .count_commits(git_dir, &format!("{tag}..HEAD"))
                    .await?;
                Ok((version, distance))
            }
            None => {
                let distance = self.git.count_commits(git_dir, "HEAD").await?;
                Ok((DEFAULT_BASE_VERSION, distance))
            }
        }
    }
}

#[async_trait]
impl VersionProvider for GitVersionProvider {
    async fn resolve(&self, git_dir: &Path) -> Result<VersionAndBranch> {
        let branch_name = self.git.current_branch(git_dir).await?;
        let sha = self.git.head_sha(git_dir).await?;
        let commit_date = self.git.commit_date(git_dir).await?;
        let (base, distance) = self.base_version(git_dir).await?;

        let branch_type = BranchType::classify(&branch_name);
        let short_sha: String = sha.chars().take(SHORT_SHA_LEN).collect();
        let version = calculate_version(&branch_name, branch_type, &base, distance)?
            .with_build_metadata(short_sha);

        debug!(
            branch = %branch_name,
            branch_type = branch_type.name(),
            base = %base,
            distance,
            version = %version,
            "Calculated version"
        );

        Ok(VersionAndBranch {
            branch_name,
            branch_type,
            sha,
            commit_date,
            version,
        })
    }
}

/// Apply the GitFlow branch rules to a base version.
///
/// Fails only when a bump would overflow a version component.
pub fn calculate_version(
    branch_name: &str,
    branch_type: BranchType,
    base: &SemanticVersion,
    distance: u64,
) -> Result<SemanticVersion> {
    let version = match branch_type {
        BranchType::Mainline => {
            if distance == 0 {
                base.stable()
            } else {
                base.bump_patch()?
            }
        }
        BranchType::Develop => base
            .bump_minor()?
            .with_pre_release("unstable", Some(distance)),
        BranchType::Release => version_from_branch(branch_name)
            .map_or_else(|| base.bump_minor(), Ok)?
            .with_pre_release("beta", Some(distance)),
        BranchType::Hotfix => version_from_branch(branch_name)
            .map_or_else(|| base.bump_patch(), Ok)?
            .with_pre_release("beta", Some(distance)),
        BranchType::Feature => {
            let label = sanitize_label(branch_suffix(branch_name));
            let label = if label.is_empty() {
                "feature".to_string()
            } else {
                label
            };
            base.bump_patch()?.with_pre_release(label, Some(distance))
        }
        BranchType::PullRequest => {
            let number = branch_suffix(branch_name)
                .split('/')
                .next()
                .and_then(|n| n.parse().ok());
            base.bump_patch()?.with_pre_release("PullRequest", number)
        }
        BranchType::Unknown => {
            let label = sanitize_label(branch_name);
            let label = if label.is_empty() {
                "unknown".to_string()
            } else {
                label
            };
            base.bump_patch()?.with_pre_release(label, Some(distance))
        }
    };
    Ok(version)
}

fn branch_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("branch version pattern is a valid regex")
    })
}

/// Version embedded in a release or hotfix branch name (`release/1.3`).
fn version_from_branch(branch_name: &str) -> Option<SemanticVersion> {
    let caps = branch_version_pattern().captures(branch_suffix(branch_name))?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    let patch = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(SemanticVersion::new(major, minor, patch))
}
