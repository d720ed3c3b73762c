//! Input checks run before git is touched.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::artifact::Language;
use crate::domain::error::{FlowverError, Result};

fn csharp_conflicts() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\[\s*assembly\s*:\s*(?:System\.Reflection\.)?(AssemblyVersion|AssemblyFileVersion|AssemblyInformationalVersion)(?:Attribute)?\s*\(",
        )
        .expect("C# conflict pattern is a valid regex")
    })
}

fn rust_conflicts() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bconst\s+(ASSEMBLY_VERSION|INFORMATIONAL_VERSION)\s*:")
            .expect("Rust conflict pattern is a valid regex")
    })
}

fn conflict_pattern(language: Language) -> &'static Regex {
    match language {
        Language::Rust => rust_conflicts(),
        Language::CSharp => csharp_conflicts(),
    }
}

/// Reject compile-file sets the generated fragment cannot coexist with.
///
/// - every file must live under `project_root`
/// - a file in the fragment's language must not already declare the
///   version metadata the fragment generates
pub fn check_for_invalid_files(
    compile_files: &[PathBuf],
    project_root: &Path,
    language: Language,
) -> Result<()> {
    let root = resolve(project_root, Path::new(""));
    let pattern = conflict_pattern(language);

    for file in compile_files {
        let path = resolve(file, &root);
        if !path.starts_with(&root) {
            return Err(FlowverError::FileOutsideProjectRoot {
                path: file.clone(),
                root: project_root.to_path_buf(),
            });
        }

        if path.extension().and_then(|e| e.to_str()) != Some(language.extension()) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            debug!(path = %path.display(), "Skipping unreadable compile file");
            continue;
        };
        for line in content.lines() {
            let line = line.trim_start();
            if line.starts_with("//") {
                continue;
            }
            if let Some(caps) = pattern.captures(line) {
                return Err(FlowverError::ConflictingVersionInfo {
                    path: file.clone(),
                    marker: caps[1].to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Absolute, normalized path. Existing paths are canonicalized so symlinked
/// temp dirs compare equal; others are normalized lexically.
fn resolve(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    if let Ok(canonical) = joined.canonicalize() {
        return canonical;
    }
    let joined = if joined.is_absolute() {
        joined
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&joined))
            .unwrap_or(joined)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
