//! Domain models for flowver.
//!
//! Canonical definitions for the core entities:
//! - `SemanticVersion`: structured semver value
//! - `BranchType`: GitFlow role of a branch
//! - `VersionAndBranch`: immutable result of version resolution
//! - `VersionVariables`: named view of a resolved version

pub mod branch;
pub mod error;
pub mod variables;
pub mod version;

// Re-export main types and errors
pub use branch::{branch_suffix, normalize_branch_name, sanitize_label, BranchType};
pub use error::{ErrorKind, FlowverError, Result};
pub use variables::{VersionVariable, VersionVariables};
pub use version::{PreReleaseTag, SemanticVersion, VersionAndBranch};
