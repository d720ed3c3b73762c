//! Git command runner used by CI pre-processing and version resolution.
//!
//! Every command is spawned as `git --git-dir <dir> ...` and bounded by the
//! configured timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::process::Command;
use tracing::debug;

use crate::domain::error::{FlowverError, Result};

/// Thin async wrapper around the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: PathBuf::from("git"),
            timeout,
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a git subcommand against `git_dir` and return trimmed stdout.
    pub async fn run(&self, git_dir: &Path, args: &[&str]) -> Result<String> {
        let command_line = args.join(" ");
        debug!(git_dir = %git_dir.display(), command = %command_line, "Running git");

        let child = Command::new(&self.program)
            .arg("--git-dir")
            .arg(git_dir)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FlowverError::GitError(format!("failed to run git: {e}")))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| FlowverError::GitTimeout {
                command: command_line.clone(),
                secs: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FlowverError::GitError(format!(
                "git {command_line} failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// HEAD commit SHA.
    pub async fn head_sha(&self, git_dir: &Path) -> Result<String> {
        let sha = self.run(git_dir, &["rev-parse", "HEAD"]).await?;
        if sha.is_empty() {
            return Err(FlowverError::GitError(
                "git rev-parse HEAD returned empty output".to_string(),
            ));
        }
        Ok(sha)
    }

    /// Current branch name, or `HEAD` when detached.
    pub async fn current_branch(&self, git_dir: &Path) -> Result<String> {
        self.run(git_dir, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await
    }

    /// Committer date of HEAD.
    pub async fn commit_date(&self, git_dir: &Path) -> Result<DateTime<Utc>> {
        let raw = self.run(git_dir, &["log", "-1", "--format=%cI", "HEAD"]).await?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| FlowverError::GitError(format!("unparseable commit date '{raw}': {e}")))
    }

    /// Tags reachable from HEAD.
    pub async fn merged_tags(&self, git_dir: &Path) -> Result<Vec<String>> {
        let raw = self.run(git_dir, &["tag", "--merged", "HEAD"]).await?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Every tag with the object it points at, one `name sha` pair per line.
    ///
    /// Changes whenever a tag is added, moved or deleted.
    pub async fn tag_fingerprint(&self, git_dir: &Path) -> Result<String> {
        self.run(
            git_dir,
            &[
                "for-each-ref",
                "--sort=refname",
                "--format=%(refname) %(objectname)",
                "refs/tags",
            ],
        )
        .await
    }

    /// Number of commits in a revision range such as `v1.2.0..HEAD`.
    pub async fn count_commits(&self, git_dir: &Path, range: &str) -> Result<u64> {
        let raw = self.run(git_dir, &["rev-list", "--count", range]).await?;
        raw.parse()
            .map_err(|_| FlowverError::GitError(format!("unexpected rev-list output: {raw}")))
    }

    /// Whether the repository is a shallow clone.
    pub fn is_shallow(git_dir: &Path) -> bool {
        git_dir.join("shallow").is_file()
    }

    /// Fetch the missing history of a shallow clone. No-op otherwise.
    pub async fn unshallow(&self, git_dir: &Path) -> Result<()> {
        if !Self::is_shallow(git_dir) {
            return Ok(());
        }
        self.run(git_dir, &["fetch", "--unshallow", "--tags"]).await?;
        Ok(())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}
