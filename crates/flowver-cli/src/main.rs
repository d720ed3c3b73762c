//! flowver - GitFlow semantic versioning for builds
//!
//! The `flowver` command is the build-step host binding.
//!
//! ## Commands
//!
//! - `run`: Resolve the version, publish it to the CI server, write the fragment
//! - `variables`: Print the version variables of a repository
//! - `build-servers`: List the known CI integrations and which ones apply

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, Level};

use flowver_ci::{BuildServerCatalog, ProcessEnv, TaskRequest, VersionTask};
use flowver_core::{
    find_git_dir, FlowverConfig, GitCli, GitVersionProvider, Language, LogSink, Severity,
    VersionProvider,
};

#[derive(Parser)]
#[command(name = "flowver")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GitFlow semantic versioning for build pipelines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true, env = "FLOWVER_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Version the current build and write the version fragment
    Run {
        /// Project file the fragment belongs to
        #[arg(long)]
        project_file: PathBuf,

        /// Root directory of the project (default: directory of the project file)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Source file compiled into the project (repeatable)
        #[arg(long = "compile-file")]
        compile_files: Vec<PathBuf>,

        /// Pin the assembly version to major.minor.0.0
        #[arg(long)]
        sign: bool,

        /// Language of the generated fragment (rust, csharp)
        #[arg(long, default_value_t = Language::Rust)]
        language: Language,

        /// Git directory (default: discovered from the project root)
        #[arg(long)]
        git_dir: Option<PathBuf>,

        /// Directory for generated fragments
        #[arg(long, env = "FLOWVER_TEMP_DIR")]
        temp_dir: Option<PathBuf>,

        /// Age in seconds after which old fragments are deleted
        #[arg(long, env = "FLOWVER_TEMP_RETENTION_SECS")]
        temp_retention_secs: Option<u64>,

        /// Timeout in seconds for each git command
        #[arg(long, env = "FLOWVER_GIT_TIMEOUT_SECS")]
        git_timeout_secs: Option<u64>,
    },

    /// Print the version variables of a repository
    Variables {
        /// Directory inside the repository
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Print as a JSON array
        #[arg(long = "as-json")]
        as_json: bool,
    },

    /// List the known CI integrations
    BuildServers {
        /// Print as a JSON array
        #[arg(long = "as-json")]
        as_json: bool,
    },
}

/// Diagnostics go to tracing (stderr); CI service messages go to stdout.
struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }

    fn service_message(&self, line: &str) {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    flowver_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            project_file,
            project_root,
            compile_files,
            sign,
            language,
            git_dir,
            temp_dir,
            temp_retention_secs,
            git_timeout_secs,
        } => {
            let mut config = FlowverConfig::from_env();
            if let Some(dir) = temp_dir {
                config.temp_dir = dir;
            }
            if let Some(secs) = temp_retention_secs {
                config.temp_retention = Duration::from_secs(secs);
            }
            if let Some(secs) = git_timeout_secs {
                config.git_timeout = Duration::from_secs(secs);
            }

            let project_root = project_root.unwrap_or_else(|| default_project_root(&project_file));
            let mut request = TaskRequest::new(project_file, project_root)
                .with_compile_files(compile_files)
                .with_sign_assembly(sign)
                .with_language(language);
            if let Some(dir) = git_dir {
                request = request.with_git_dir(dir);
            }
            cmd_run(&config, &request).await
        }
        Commands::Variables { path, as_json } => cmd_variables(&path, as_json).await,
        Commands::BuildServers { as_json } => cmd_build_servers(as_json),
    }
}

fn default_project_root(project_file: &Path) -> PathBuf {
    match project_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run the version task and print the artifact path
async fn cmd_run(config: &FlowverConfig, request: &TaskRequest) -> Result<ExitCode> {
    let outcome = VersionTask::new(config).execute(request, ConsoleSink).await;

    if let Some(path) = &outcome.artifact_path {
        println!("FLOWVER_ARTIFACT={}", path.display());
    }

    if outcome.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Print the version variables of the repository containing `path`
async fn cmd_variables(path: &Path, as_json: bool) -> Result<ExitCode> {
    let config = FlowverConfig::from_env();
    let git_dir = find_git_dir(path)
        .with_context(|| format!("No .git directory found in '{}' or any parent", path.display()))?;

    let provider = GitVersionProvider::new(GitCli::new(config.git_timeout));
    let version = provider
        .resolve(&git_dir)
        .await
        .context("Failed to resolve version")?;
    info!(git_dir = %git_dir.display(), semver = %version.semver(), "Resolved version");

    let variables = version.variables();
    if as_json {
        println!("{}", variables.to_json_pretty()?);
    } else {
        for variable in &variables {
            println!("{}: {}", variable.name, variable.value);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// List integrations in catalog order and whether each applies here
fn cmd_build_servers(as_json: bool) -> Result<ExitCode> {
    let catalog = BuildServerCatalog::with_defaults();
    let env = ProcessEnv;
    let rows: Vec<(&str, bool)> = catalog
        .servers()
        .iter()
        .map(|s| (s.name(), s.can_apply(&env)))
        .collect();

    if as_json {
        let value = json!(rows
            .iter()
            .map(|(name, applies)| json!({ "name": name, "applies": applies }))
            .collect::<Vec<_>>());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for (name, applies) in rows {
            let marker = if applies { "*" } else { " " };
            println!("{marker} {name}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
