//! Locate the `.git` directory for a project.

use std::fs;
use std::path::{Path, PathBuf};

/// Walk upward from `start` and return the first `.git` directory found.
///
/// A `.git` *file* (worktrees, submodules) is followed through its
/// `gitdir:` line.
pub fn find_git_dir(start: &Path) -> Option<PathBuf> {
    let start = start
        .canonicalize()
        .unwrap_or_else(|_| start.to_path_buf());

    for dir in start.ancestors() {
        let candidate = dir.join(".git");
        if candidate.is_dir() {
            return Some(candidate);
        }
        if candidate.is_file() {
            if let Some(target) = read_gitdir_file(&candidate, dir) {
                return Some(target);
            }
        }
    }
    None
}

fn read_gitdir_file(file: &Path, base: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(file).ok()?;
    let target = content
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))?
        .trim();
    let path = Path::new(target);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    path.is_dir().then_some(path)
}
