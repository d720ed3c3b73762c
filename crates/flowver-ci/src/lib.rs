//! flowver CI - build server integrations and the version task
//!
//! Provides the build-step orchestrator that:
//! - Detects the CI servers the build is running under
//! - Repairs shallow checkouts before the version is resolved
//! - Publishes the version to each CI server
//! - Writes the version fragment compiled into the build

pub mod catalog;
pub mod env;
pub mod pipeline;
pub mod server;
pub mod servers;

// Re-export key types
pub use catalog::BuildServerCatalog;
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use pipeline::{TaskOutcome, TaskRequest, VersionTask};
pub use server::{render_server_output, BuildServer, BuildServerError};
