//! Named version variables exposed to CI servers and generated artifacts.

use serde::Serialize;

use super::version::VersionAndBranch;
use super::error::Result;

/// One `name = value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionVariable {
    pub name: &'static str,
    pub value: String,
}

/// Ordered, finite set of version variables. Iterating it is restartable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionVariables(Vec<VersionVariable>);

impl VersionVariables {
    pub fn from_version(version: &VersionAndBranch) -> Self {
        let v = &version.version;
        let (label, number) = match &v.pre_release {
            Some(tag) => (
                tag.label.clone(),
                tag.number.map(|n| n.to_string()).unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        let entries = vec![
            ("Major", v.major.to_string()),
            ("Minor", v.minor.to_string()),
            ("Patch", v.patch.to_string()),
            (
                "PreReleaseTag",
                v.pre_release.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            ),
            ("PreReleaseLabel", label),
            ("PreReleaseNumber", number),
            ("BuildMetaData", v.build_metadata.clone().unwrap_or_default()),
            ("SemVer", v.to_semver_string()),
            ("FullSemVer", v.to_full_semver_string()),
            ("AssemblySemVer", v.assembly_file_version()),
            ("BranchName", version.branch_name.clone()),
            ("BranchType", version.branch_type.name().to_string()),
            ("Sha", version.sha.clone()),
            ("CommitDate", version.commit_date_string()),
        ];
        Self(
            entries
                .into_iter()
                .map(|(name, value)| VersionVariable { name, value })
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionVariable> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pretty JSON array of `{"name", "value"}` objects, in variable order.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a VersionVariables {
    type Item = &'a VersionVariable;
    type IntoIter = std::slice::Iter<'a, VersionVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
