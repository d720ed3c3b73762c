//! Version resolution against real git repositories.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use flowver_core::{
    BranchType, CachedVersionProvider, ErrorKind, FlowverError, GitCli, GitVersionProvider,
    SemanticVersion, VersionProvider,
};

fn run_git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .expect("git available");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit(repo_dir: &Path, message: &str) {
    run_git(repo_dir, &["commit", "--allow-empty", "-m", message]);
}

fn make_git_repo() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    run_git(dir.path(), &["init"]);
    run_git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    run_git(dir.path(), &["config", "user.name", "test-user"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
    run_git(dir.path(), &["config", "tag.gpgsign", "false"]);
    commit(dir.path(), "initial");
    let git_dir = dir.path().join(".git");
    (dir, git_dir)
}

/// `v1.2.0` tagged two commits behind HEAD on `feature/login`.
fn feature_login_repo() -> (tempfile::TempDir, PathBuf) {
    let (dir, git_dir) = make_git_repo();
    run_git(dir.path(), &["tag", "v1.2.0"]);
    run_git(dir.path(), &["checkout", "-b", "feature/login"]);
    commit(dir.path(), "login form");
    commit(dir.path(), "login validation");
    (dir, git_dir)
}

fn provider() -> GitVersionProvider {
    GitVersionProvider::new(GitCli::default())
}

#[tokio::test]
async fn feature_branch_two_commits_after_tag() {
    let (_dir, git_dir) = feature_login_repo();

    let resolved = provider().resolve(&git_dir).await.unwrap();

    assert_eq!(resolved.branch_name, "feature/login");
    assert_eq!(resolved.branch_type, BranchType::Feature);
    assert_eq!(resolved.version.major, 1);
    assert_eq!(resolved.version.minor, 2);
    assert_eq!(resolved.semver(), "1.2.1-login.2");
    assert_eq!(
        resolved.version.build_metadata.as_deref(),
        Some(&resolved.sha[..7])
    );
}

#[tokio::test]
async fn resolve_is_deterministic() {
    let (_dir, git_dir) = feature_login_repo();
    let provider = provider();

    let first = provider.resolve(&git_dir).await.unwrap();
    let second = provider.resolve(&git_dir).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.full_semver(), second.full_semver());
}

#[tokio::test]
async fn tagged_mainline_is_stable_release() {
    let (dir, git_dir) = make_git_repo();
    run_git(dir.path(), &["tag", "v2.0.0"]);

    let resolved = provider().resolve(&git_dir).await.unwrap();

    assert_eq!(resolved.branch_type, BranchType::Mainline);
    assert_eq!(resolved.semver(), "2.0.0");
}

#[tokio::test]
async fn highest_reachable_tag_wins() {
    let (dir, git_dir) = make_git_repo();
    run_git(dir.path(), &["tag", "v1.9.0"]);
    commit(dir.path(), "next");
    run_git(dir.path(), &["tag", "v1.10.0"]);
    run_git(dir.path(), &["tag", "not-a-version"]);
    run_git(dir.path(), &["checkout", "-b", "develop"]);
    commit(dir.path(), "work");

    let resolved = provider().resolve(&git_dir).await.unwrap();

    assert_eq!(resolved.semver(), "1.11.0-unstable.1");
}

#[tokio::test]
async fn untagged_repository_uses_default_base() {
    let (dir, git_dir) = make_git_repo();
    commit(dir.path(), "second");

    let resolved = provider().resolve(&git_dir).await.unwrap();

    let expected = SemanticVersion::new(0, 1, 1);
    assert_eq!(resolved.version.stable(), expected);
    assert!(resolved.version.is_stable());
}

#[tokio::test]
async fn cached_provider_matches_inner_provider() {
    let (_dir, git_dir) = feature_login_repo();
    let inner = Arc::new(provider());
    let cached = CachedVersionProvider::new(inner.clone(), GitCli::default());

    let direct = inner.resolve(&git_dir).await.unwrap();
    let via_cache = cached.resolve(&git_dir).await.unwrap();
    let again = cached.resolve(&git_dir).await.unwrap();

    assert_eq!(direct, via_cache);
    assert_eq!(via_cache, again);
    assert_eq!(cached.len(), 1);
}

#[tokio::test]
async fn cached_provider_sees_tag_added_on_same_head() {
    let (_dir, git_dir) = make_git_repo();
    let repo_dir = git_dir.parent().unwrap().to_path_buf();
    let cached = CachedVersionProvider::new(Arc::new(provider()), GitCli::default());

    let before = cached.resolve(&git_dir).await.unwrap();
    assert_eq!(before.semver(), "0.1.1");

    run_git(&repo_dir, &["tag", "v2.0.0"]);
    let after = cached.resolve(&git_dir).await.unwrap();
    let fresh = provider().resolve(&git_dir).await.unwrap();

    assert_eq!(after.semver(), "2.0.0");
    assert_eq!(after, fresh);
}

#[tokio::test]
async fn unbumpable_tag_fails_resolution() {
    let (dir, git_dir) = make_git_repo();
    run_git(dir.path(), &["tag", "v0.0.18446744073709551615"]);
    commit(dir.path(), "after the tag");

    let err = provider().resolve(&git_dir).await.unwrap_err();

    assert!(matches!(err, FlowverError::VersionResolution(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Unexpected);
}
