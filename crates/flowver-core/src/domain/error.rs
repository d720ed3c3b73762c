//! Error taxonomy for flowver.

use std::error::Error as StdError;
use std::path::PathBuf;

/// How a failure is surfaced to the host build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-actionable. Rendered as a single line without internal detail.
    Expected,

    /// Anything else. Rendered with the full diagnostic chain.
    Unexpected,
}

/// flowver errors.
#[derive(Debug, thiserror::Error)]
pub enum FlowverError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("compile file {} is outside the project root {}", path.display(), root.display())]
    FileOutsideProjectRoot { path: PathBuf, root: PathBuf },

    #[error(
        "file {} already declares {marker}, which conflicts with the generated version info; remove it",
        path.display()
    )]
    ConflictingVersionInfo { path: PathBuf, marker: String },

    #[error("git directory {} does not exist", .0.display())]
    GitDirectoryNotFound(PathBuf),

    #[error("git error: {0}")]
    GitError(String),

    #[error("git {command} timed out after {secs} seconds")]
    GitTimeout { command: String, secs: u64 },

    #[error("version resolution failed: {0}")]
    VersionResolution(String),

    #[error("pre-processing for build server '{server}' failed")]
    PreProcessing {
        server: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("failed to write version artifact {}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlowverError {
    /// Classify this error for the host boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowverError::InvalidInput(_)
            | FlowverError::FileOutsideProjectRoot { .. }
            | FlowverError::ConflictingVersionInfo { .. }
            | FlowverError::GitDirectoryNotFound(_) => ErrorKind::Expected,
            _ => ErrorKind::Unexpected,
        }
    }

    /// Render the error the way the host should display it.
    ///
    /// Expected errors are a single line. Unexpected errors carry every
    /// `caused by` entry of the source chain plus the debug representation.
    pub fn describe(&self) -> String {
        match self.kind() {
            ErrorKind::Expected => self.to_string(),
            ErrorKind::Unexpected => {
                let mut out = format!("Error occurred: {self}");
                let mut source = self.source();
                while let Some(cause) = source {
                    out.push_str(&format!("\n  caused by: {cause}"));
                    source = cause.source();
                }
                out.push_str(&format!("\n{self:?}"));
                out
            }
        }
    }
}

/// Result type for flowver operations.
pub type Result<T> = std::result::Result<T, FlowverError>;
