//! Rendering of the version fragment the compiler includes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::{FlowverError, Result};
use crate::domain::version::VersionAndBranch;
use crate::temp_files::TempArtifactTracker;

/// Source language of the generated fragment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Constants for `include!`.
    #[default]
    Rust,

    /// Assembly attributes for an MSBuild compile item.
    CSharp,
}

impl Language {
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Rust => "rs",
            Language::CSharp => "cs",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Rust => "rust",
            Language::CSharp => "csharp",
        })
    }
}

impl FromStr for Language {
    type Err = FlowverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Language::Rust),
            "csharp" | "cs" | "c#" => Ok(Language::CSharp),
            other => Err(FlowverError::InvalidInput(format!(
                "unsupported language '{other}' (expected rust or csharp)"
            ))),
        }
    }
}

const GENERATED_HEADER: &str = concat!(
    "<auto-generated>\n",
    "Generated by flowver ",
    env!("CARGO_PKG_VERSION"),
    ". Changes to this file are lost on the next build.\n",
    "</auto-generated>"
);

/// Render the fragment text. Pure function of its inputs.
///
/// With `signed` set, the assembly version is pinned to `major.minor.0.0`
/// and the full-precision form is never emitted.
pub fn render_version_info(version: &VersionAndBranch, signed: bool, language: Language) -> String {
    match language {
        Language::Rust => render_rust(version, signed),
        Language::CSharp => render_csharp(version, signed),
    }
}

fn render_rust(version: &VersionAndBranch, signed: bool) -> String {
    let v = &version.version;
    let mut out = String::new();
    for line in GENERATED_HEADER.lines() {
        out.push_str(&format!("// {line}\n"));
    }
    out.push('\n');
    out.push_str(&format!(
        "pub const ASSEMBLY_VERSION: &str = {:?};\n",
        v.assembly_version(signed)
    ));
    out.push_str(&format!(
        "pub const ASSEMBLY_FILE_VERSION: &str = {:?};\n",
        v.assembly_file_version()
    ));
    out.push_str(&format!(
        "pub const INFORMATIONAL_VERSION: &str = {:?};\n",
        v.to_full_semver_string()
    ));
    out.push_str(&format!(
        "pub const RELEASE_DATE: &str = {:?};\n",
        version.commit_date_string()
    ));
    out.push_str("\n#[allow(dead_code)]\npub mod flowver_information {\n");
    for var in &version.variables() {
        out.push_str(&format!(
            "    pub const {}: &str = {:?};\n",
            screaming_snake(var.name),
            var.value
        ));
    }
    out.push_str("}\n");
    out
}

fn render_csharp(version: &VersionAndBranch, signed: bool) -> String {
    let v = &version.version;
    let mut out = String::new();
    out.push_str("//------------------------------------------------------------------------------\n");
    for line in GENERATED_HEADER.lines() {
        out.push_str(&format!("// {line}\n"));
    }
    out.push_str("//------------------------------------------------------------------------------\n\n");
    out.push_str("using System.Reflection;\n\n");
    out.push_str(&format!(
        "[assembly: AssemblyVersion(\"{}\")]\n",
        v.assembly_version(signed)
    ));
    out.push_str(&format!(
        "[assembly: AssemblyFileVersion(\"{}\")]\n",
        v.assembly_file_version()
    ));
    out.push_str(&format!(
        "[assembly: AssemblyInformationalVersion(\"{}\")]\n",
        csharp_escape(&v.to_full_semver_string())
    ));
    out.push_str(&format!(
        "[assembly: AssemblyMetadata(\"ReleaseDate\", \"{}\")]\n\n",
        version.commit_date_string()
    ));
    out.push_str("namespace FlowVer\n{\n");
    out.push_str("    [System.Runtime.CompilerServices.CompilerGenerated]\n");
    out.push_str("    static class FlowVerInformation\n    {\n");
    for var in &version.variables() {
        out.push_str(&format!(
            "        public const string {} = \"{}\";\n",
            var.name,
            csharp_escape(&var.value)
        ));
    }
    out.push_str("    }\n}\n");
    out
}

/// `PreReleaseTag` -> `PRE_RELEASE_TAG`
fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

fn csharp_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes rendered fragments through the [`TempArtifactTracker`].
pub struct ArtifactGenerator<'a> {
    tracker: &'a TempArtifactTracker,
}

impl<'a> ArtifactGenerator<'a> {
    pub fn new(tracker: &'a TempArtifactTracker) -> Self {
        Self { tracker }
    }

    /// Render and write the fragment for `project_name`; returns its path.
    pub fn write(
        &self,
        project_name: &str,
        version: &VersionAndBranch,
        signed: bool,
        language: Language,
    ) -> Result<PathBuf> {
        let text = render_version_info(version, signed, language);
        self.tracker
            .register_and_write(project_name, language.extension(), &text)
    }
}
