//! Per-process memoization of resolved versions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::error::Result;
use crate::domain::version::VersionAndBranch;
use crate::git::GitCli;
use crate::version_provider::VersionProvider;

/// Cache key: repository, checked-out branch and commit, and every tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RepositoryState {
    git_dir: PathBuf,
    branch: String,
    head: String,
    tags: String,
}

/// Wraps a [`VersionProvider`] and reuses results while HEAD is unchanged.
pub struct CachedVersionProvider {
    inner: Arc<dyn VersionProvider>,
    git: GitCli,
    cache: Mutex<HashMap<RepositoryState, VersionAndBranch>>,
}

impl CachedVersionProvider {
    pub fn new(inner: Arc<dyn VersionProvider>, git: GitCli) -> Self {
        Self {
            inner,
            git,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of memoized repository states.
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn state_of(&self, git_dir: &Path) -> Result<RepositoryState> {
        Ok(RepositoryState {
            git_dir: git_dir.to_path_buf(),
            branch: self.git.current_branch(git_dir).await?,
            head: self.git.head_sha(git_dir).await?,
            tags: self.git.tag_fingerprint(git_dir).await?,
        })
    }
}

#[async_trait]
impl VersionProvider for CachedVersionProvider {
    async fn resolve(&self, git_dir: &Path) -> Result<VersionAndBranch> {
        let state = self.state_of(git_dir).await?;

        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&state)
            .cloned();
        if let Some(hit) = cached {
            debug!(git_dir = %git_dir.display(), head = %state.head, "Version cache hit");
            return Ok(hit);
        }

        let resolved = self.inner.resolve(git_dir).await?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(state, resolved.clone());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::branch::BranchType;
    use crate::domain::version::SemanticVersion;
    use chrono::Utc;
    use std::process::Command as StdCommand;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VersionProvider for CountingProvider {
        async fn resolve(&self, _git_dir: &Path) -> Result<VersionAndBranch> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            Ok(VersionAndBranch {
                branch_name: "main".to_string(),
                branch_type: BranchType::Mainline,
                sha: "0".repeat(40),
                commit_date: Utc::now(),
                version: SemanticVersion::new(1, 0, n),
            })
        }
    }

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        run_git(dir.path(), &["commit", "--allow-empty", "-m", "initial"]);
        dir
    }

    #[tokio::test]
    async fn same_head_is_served_from_cache() {
        let repo = make_git_repo();
        let git_dir = repo.path().join(".git");
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedVersionProvider::new(inner.clone(), GitCli::default());

        let first = cached.resolve(&git_dir).await.unwrap();
        let second = cached.resolve(&git_dir).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn new_commit_invalidates() {
        let repo = make_git_repo();
        let git_dir = repo.path().join(".git");
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedVersionProvider::new(inner.clone(), GitCli::default());

        let first = cached.resolve(&git_dir).await.unwrap();
        run_git(repo.path(), &["commit", "--allow-empty", "-m", "next"]);
        let second = cached.resolve(&git_dir).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn new_tag_on_same_head_invalidates() {
        let repo = make_git_repo();
        let git_dir = repo.path().join(".git");
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedVersionProvider::new(inner.clone(), GitCli::default());

        cached.resolve(&git_dir).await.unwrap();
        run_git(repo.path(), &["tag", "v2.0.0"]);
        cached.resolve(&git_dir).await.unwrap();
        run_git(repo.path(), &["tag", "-d", "v2.0.0"]);
        cached.resolve(&git_dir).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);
    }
}
