//! flowver Core Library
//!
//! Version model, git access, version resolution, generated artifacts and
//! the invocation-scoped log used by the build-step pipeline in `flowver-ci`.

pub mod artifact;
pub mod config;
pub mod domain;
pub mod git;
pub mod git_dir;
pub mod invocation_log;
pub mod obs;
pub mod telemetry;
pub mod temp_files;
pub mod validation;
pub mod version_cache;
pub mod version_provider;

pub use artifact::{render_version_info, ArtifactGenerator, Language};
pub use config::FlowverConfig;
pub use domain::{
    BranchType, ErrorKind, FlowverError, PreReleaseTag, Result, SemanticVersion,
    VersionAndBranch, VersionVariable, VersionVariables,
};
pub use git::GitCli;
pub use git_dir::find_git_dir;
pub use invocation_log::{
    InvocationLog, InvocationScope, LogEntry, LogSink, MemorySink, Severity, TracingSink,
};
pub use temp_files::{TempArtifactTracker, ARTIFACT_PREFIX};
pub use validation::check_for_invalid_files;
pub use version_cache::CachedVersionProvider;
pub use version_provider::{calculate_version, GitVersionProvider, VersionProvider};

pub use telemetry::init_tracing;

/// flowver version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
