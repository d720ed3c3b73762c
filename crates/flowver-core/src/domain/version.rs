//! Semantic version values produced by version resolution.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::branch::BranchType;
use super::error::{FlowverError, Result};
use super::variables::VersionVariables;

/// Pre-release part of a semantic version, e.g. `beta.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreReleaseTag {
    /// Label such as `unstable`, `beta` or a sanitized feature name.
    pub label: String,

    /// Optional numeric suffix.
    pub number: Option<u64>,
}

impl PreReleaseTag {
    pub fn new(label: impl Into<String>, number: Option<u64>) -> Self {
        Self {
            label: label.into(),
            number,
        }
    }
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(number) => write!(f, "{}.{}", self.label, number),
            None => f.write_str(&self.label),
        }
    }
}

/// Structured `major.minor.patch[-pre][+meta]` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreReleaseTag>,
    pub build_metadata: Option<String>,
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[vV]?(\d+)\.(\d+)\.(\d+)$").expect("tag pattern is a valid regex")
    })
}

impl SemanticVersion {
    /// Stable version without pre-release or metadata.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Parse a release tag such as `v1.2.0` or `1.2.0`.
    ///
    /// Returns `None` for anything that is not a plain stable version.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let caps = tag_pattern().captures(tag.trim())?;
        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        let patch = caps[3].parse().ok()?;
        Some(Self::new(major, minor, patch))
    }

    /// Next patch version; fails when the patch number is already `u64::MAX`.
    pub fn bump_patch(&self) -> Result<Self> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or_else(|| self.overflow("patch"))?;
        Ok(Self::new(self.major, self.minor, patch))
    }

    /// Next minor version with patch reset to 0.
    pub fn bump_minor(&self) -> Result<Self> {
        let minor = self
            .minor
            .checked_add(1)
            .ok_or_else(|| self.overflow("minor"))?;
        Ok(Self::new(self.major, minor, 0))
    }

    fn overflow(&self, part: &str) -> FlowverError {
        FlowverError::VersionResolution(format!(
            "cannot increment the {part} number of {}",
            self.to_semver_string()
        ))
    }

    /// Drop pre-release and metadata.
    pub fn stable(&self) -> Self {
        Self::new(self.major, self.minor, self.patch)
    }

    pub fn with_pre_release(mut self, label: impl Into<String>, number: Option<u64>) -> Self {
        self.pre_release = Some(PreReleaseTag::new(label, number));
        self
    }

    pub fn with_build_metadata(mut self, metadata: impl Into<String>) -> Self {
        let metadata = metadata.into();
        self.build_metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }

    pub fn is_stable(&self) -> bool {
        self.pre_release.is_none()
    }

    /// `major.minor.patch[-pre]`, without build metadata.
    pub fn to_semver_string(&self) -> String {
        match &self.pre_release {
            Some(tag) => format!("{}.{}.{}-{}", self.major, self.minor, self.patch, tag),
            None => format!("{}.{}.{}", self.major, self.minor, self.patch),
        }
    }

    /// Semver string including `+metadata` when present.
    pub fn to_full_semver_string(&self) -> String {
        match &self.build_metadata {
            Some(meta) => format!("{}+{}", self.to_semver_string(), meta),
            None => self.to_semver_string(),
        }
    }

    /// Four-part `major.minor.patch.0` form.
    pub fn assembly_file_version(&self) -> String {
        format!("{}.{}.{}.0", self.major, self.minor, self.patch)
    }

    /// Assembly version as allowed for the signing mode.
    ///
    /// Signed artifacts pin the binding version to `major.minor.0.0`.
    pub fn assembly_version(&self, signed: bool) -> String {
        if signed {
            format!("{}.{}.0.0", self.major, self.minor)
        } else {
            self.assembly_file_version()
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_semver_string())
    }
}

/// Result of version resolution for one repository state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionAndBranch {
    /// Branch name as reported by git (`HEAD` when detached).
    pub branch_name: String,

    /// GitFlow role of the branch.
    pub branch_type: BranchType,

    /// Full commit SHA of HEAD.
    pub sha: String,

    /// Committer date of HEAD.
    pub commit_date: DateTime<Utc>,

    /// Computed version.
    pub version: SemanticVersion,
}

impl VersionAndBranch {
    /// Canonical semver string (no build metadata).
    pub fn semver(&self) -> String {
        self.version.to_semver_string()
    }

    pub fn full_semver(&self) -> String {
        self.version.to_full_semver_string()
    }

    /// Committer date rendered as RFC 3339 in UTC.
    pub fn commit_date_string(&self) -> String {
        self.commit_date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Ordered name/value view used by build servers and artifacts.
    pub fn variables(&self) -> VersionVariables {
        VersionVariables::from_version(self)
    }
}
