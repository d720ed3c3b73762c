//! Structured observability hooks for the invocation lifecycle.
//!
//! Events are emitted at `info!` level; filter them with `RUST_LOG`.

use std::path::Path;

use tracing::info;

/// Span wrapping one invocation; attach it with `Instrument::instrument`.
pub fn invocation_span(project: &str) -> tracing::Span {
    tracing::info_span!("flowver.invocation", project = %project)
}

/// Emit event: invocation started.
pub fn emit_invocation_started(project: &str, signed: bool) {
    info!(event = "invocation.started", project = %project, signed = signed);
}

/// Emit event: build servers selected for this environment.
pub fn emit_build_servers_selected(names: &[&str]) {
    info!(event = "build_servers.selected", count = names.len(), servers = ?names);
}

/// Emit event: version resolved.
pub fn emit_version_resolved(semver: &str, branch: &str) {
    info!(event = "version.resolved", semver = %semver, branch = %branch);
}

/// Emit event: version fragment written.
pub fn emit_artifact_written(path: &Path) {
    info!(event = "artifact.written", path = %path.display());
}

/// Emit event: invocation finished.
pub fn emit_invocation_finished(duration_ms: u64, success: bool) {
    info!(
        event = "invocation.finished",
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: one build server failed to render its output (warning level).
pub fn emit_build_server_render_error(server: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "build_server.render_error", server = %server, error = %error);
}
