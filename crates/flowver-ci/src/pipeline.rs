//! The version task: one build-step invocation from cleanup to artifact.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use flowver_core::obs;
use flowver_core::{
    check_for_invalid_files, find_git_dir, ArtifactGenerator, CachedVersionProvider,
    FlowverConfig, FlowverError, GitCli, GitVersionProvider, InvocationLog, InvocationScope,
    Language, LogSink, TempArtifactTracker, VersionAndBranch, VersionProvider,
};
use tracing::Instrument;

use crate::catalog::BuildServerCatalog;
use crate::env::{EnvSource, ProcessEnv};
use crate::server::{render_server_output, BuildServer};

/// Inputs of one invocation, as supplied by the host build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub project_file: PathBuf,
    pub project_root: PathBuf,
    pub compile_files: Vec<PathBuf>,
    pub sign_assembly: bool,
    pub language: Language,
    /// Explicit git directory; discovered from `project_root` when absent.
    pub git_dir: Option<PathBuf>,
}

impl TaskRequest {
    pub fn new(project_file: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_file: project_file.into(),
            project_root: project_root.into(),
            compile_files: Vec::new(),
            sign_assembly: false,
            language: Language::default(),
            git_dir: None,
        }
    }

    pub fn with_compile_files(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.compile_files = files.into_iter().collect();
        self
    }

    pub fn with_sign_assembly(mut self, sign: bool) -> Self {
        self.sign_assembly = sign;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_git_dir(mut self, git_dir: impl Into<PathBuf>) -> Self {
        self.git_dir = Some(git_dir.into());
        self
    }

    /// File stem of the project file, used to name the artifact.
    pub fn project_name(&self) -> String {
        self.project_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of one invocation.
#[derive(Debug, Clone, Default)]
pub struct TaskOutcome {
    pub success: bool,

    /// Generated fragment; the host's single output parameter.
    pub artifact_path: Option<PathBuf>,

    pub version: Option<VersionAndBranch>,

    /// Integrations that applied, in selection order.
    pub build_servers: Vec<&'static str>,
}

impl TaskOutcome {
    fn failed(build_servers: Vec<&'static str>) -> Self {
        Self {
            success: false,
            build_servers,
            ..Self::default()
        }
    }
}

/// Orchestrates cleanup, validation, CI integration and artifact generation.
pub struct VersionTask {
    catalog: BuildServerCatalog,
    provider: Arc<dyn VersionProvider>,
    tracker: TempArtifactTracker,
    git: GitCli,
    env: Arc<dyn EnvSource>,
}

impl VersionTask {
    /// Default collaborators: built-in catalog, cached git provider, process env.
    pub fn new(config: &FlowverConfig) -> Self {
        let git = GitCli::new(config.git_timeout);
        let provider = CachedVersionProvider::new(
            Arc::new(GitVersionProvider::new(git.clone())),
            git.clone(),
        );
        Self {
            catalog: BuildServerCatalog::with_defaults(),
            provider: Arc::new(provider),
            tracker: TempArtifactTracker::from_config(config),
            git,
            env: Arc::new(ProcessEnv),
        }
    }

    pub fn with_catalog(mut self, catalog: BuildServerCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn VersionProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_tracker(mut self, tracker: TempArtifactTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_git(mut self, git: GitCli) -> Self {
        self.git = git;
        self
    }

    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    pub fn catalog(&self) -> &BuildServerCatalog {
        &self.catalog
    }

    /// Run one invocation, logging through `sink`.
    ///
    /// Every failure is reported through the sink and turned into an
    /// unsuccessful outcome. The sink is reset exactly once before returning.
    pub async fn execute(&self, request: &TaskRequest, sink: impl LogSink + 'static) -> TaskOutcome {
        let scope = InvocationScope::acquire(sink);
        let project = request.project_name();
        let start = Instant::now();
        obs::emit_invocation_started(&project, request.sign_assembly);

        let mut selected = Vec::new();
        let result = self
            .inner_execute(request, scope.log(), &mut selected)
            .instrument(obs::invocation_span(&project))
            .await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                // Expected errors are shown verbatim; the rest with full detail.
                scope.log().error(err.describe());
                TaskOutcome::failed(selected)
            }
        };

        obs::emit_invocation_finished(start.elapsed().as_millis() as u64, outcome.success);
        scope.release();
        outcome
    }

    /// Blocking wrapper for hosts without a runtime, such as build scripts.
    pub fn execute_blocking(
        &self,
        request: &TaskRequest,
        sink: impl LogSink + 'static,
    ) -> flowver_core::Result<TaskOutcome> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.execute(request, sink)))
    }

    async fn inner_execute(
        &self,
        request: &TaskRequest,
        log: &InvocationLog,
        selected: &mut Vec<&'static str>,
    ) -> flowver_core::Result<TaskOutcome> {
        self.tracker.cleanup_all();

        check_for_invalid_files(&request.compile_files, &request.project_root, request.language)?;

        let Some(git_dir) = self.locate_git_dir(request)? else {
            log.warn(format!(
                "No .git directory found in '{}' or any parent directory. \
                 Version information will not be generated for this build.",
                request.project_root.display()
            ));
            return Ok(TaskOutcome {
                success: true,
                ..TaskOutcome::default()
            });
        };

        let servers = self.catalog.select_applicable(self.env.as_ref());
        selected.extend(servers.iter().map(|s| s.name()));
        obs::emit_build_servers_selected(selected.as_slice());
        for server in &servers {
            log.info(format!("Applicable build agent found: '{}'.", server.name()));
        }

        for server in &servers {
            log.info(format!("Running pre-processing for build server '{}'.", server.name()));
            server
                .perform_pre_processing(&git_dir, &self.git)
                .await
                .map_err(|source| FlowverError::PreProcessing {
                    server: server.name().to_string(),
                    source: Box::new(source),
                })?;
        }

        let version = self.provider.resolve(&git_dir).await?;
        obs::emit_version_resolved(&version.full_semver(), &version.branch_name);

        self.write_integration_parameters(&servers, &version, log);

        let artifact = ArtifactGenerator::new(&self.tracker).write(
            &request.project_name(),
            &version,
            request.sign_assembly,
            request.language,
        )?;
        obs::emit_artifact_written(&artifact);

        Ok(TaskOutcome {
            success: true,
            artifact_path: Some(artifact),
            version: Some(version),
            build_servers: selected.clone(),
        })
    }

    fn locate_git_dir(&self, request: &TaskRequest) -> flowver_core::Result<Option<PathBuf>> {
        match &request.git_dir {
            Some(dir) if dir.is_dir() => Ok(Some(dir.clone())),
            Some(dir) => Err(FlowverError::GitDirectoryNotFound(dir.clone())),
            None => Ok(find_git_dir(&request.project_root)),
        }
    }

    /// Emit each server's lines; one server failing does not affect the others.
    fn write_integration_parameters(
        &self,
        servers: &[Arc<dyn BuildServer>],
        version: &VersionAndBranch,
        log: &InvocationLog,
    ) {
        for server in servers {
            match render_server_output(server.as_ref(), version) {
                Ok(lines) => {
                    for line in lines {
                        log.service_message(line);
                    }
                }
                Err(err) => {
                    obs::emit_build_server_render_error(server.name(), &err);
                    log.warn(format!(
                        "Build server '{}' could not publish version variables: {err}",
                        server.name()
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_is_file_stem() {
        let request = TaskRequest::new("/src/app/app.csproj", "/src/app");
        assert_eq!(request.project_name(), "app");
        assert_eq!(TaskRequest::new("", "/").project_name(), "");
    }

    #[test]
    fn builder_sets_fields() {
        let request = TaskRequest::new("a.toml", ".")
            .with_sign_assembly(true)
            .with_language(Language::CSharp)
            .with_git_dir("/repo/.git")
            .with_compile_files([PathBuf::from("src/lib.rs")]);
        assert!(request.sign_assembly);
        assert_eq!(request.language, Language::CSharp);
        assert_eq!(request.git_dir, Some(PathBuf::from("/repo/.git")));
        assert_eq!(request.compile_files.len(), 1);
    }

    #[test]
    fn failed_outcome_keeps_selected_servers() {
        let outcome = TaskOutcome::failed(vec!["TeamCity"]);
        assert!(!outcome.success);
        assert!(outcome.artifact_path.is_none());
        assert_eq!(outcome.build_servers, vec!["TeamCity"]);
    }
}
