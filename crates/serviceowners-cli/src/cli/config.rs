//! Configuration handling for the CLI.
//!
//! This module resolves the repository root and rule file locations from the
//! CLI arguments, loads the rule set and service metadata, and sets up the
//! GitHub client used by the action mode.

use crate::cli::Args;
use crate::cli::git;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use serviceowners_core::{
    ParseError, RuleSet, ServiceCatalog, ServicesError, load_services, parse_rules,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The SERVICEOWNERS file does not exist.
    #[error("SERVICEOWNERS file not found: {}", .0.display())]
    ServiceownersNotFound(PathBuf),

    /// GitHub authentication error.
    #[error("GitHub authentication error: {0}")]
    GitHubAuth(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed and found nothing to fail on.
    Success = 0,
    /// Usage, parse, git or lint failure.
    Failure = 2,
    /// Changed files without an owning service (with fail-on-unmapped).
    Unmapped = 3,
    /// Terminated by signal (SIGINT/SIGTERM).
    Terminated = 130,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Resolved locations used by every subcommand.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Absolute repository root.
    pub repo_root: PathBuf,
    /// Path to the SERVICEOWNERS file.
    pub serviceowners_path: PathBuf,
    /// Name used for the SERVICEOWNERS file in diagnostics.
    pub serviceowners_source: String,
    /// Path to the service metadata file.
    pub services_path: PathBuf,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    ///
    /// The repository root is `--repo-root` when given, else the enclosing
    /// git checkout of the current directory, else the current directory.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let repo_root = match &args.repo_root {
            Some(root) => root.canonicalize().map_err(|e| {
                ConfigError::Invalid(format!(
                    "repository root '{}' is invalid: {}",
                    root.display(),
                    e
                ))
            })?,
            None => {
                let cwd = std::env::current_dir()?;
                match git::find_repo_root(&cwd) {
                    Ok(root) => root,
                    Err(e) => {
                        debug!("Not in a git checkout ({}), using {}", e, cwd.display());
                        cwd
                    }
                }
            }
        };

        Ok(Self::new(
            repo_root,
            &args.serviceowners_file,
            &args.services_file,
        ))
    }

    /// Builds a configuration for an already resolved repository root.
    ///
    /// Relative file paths are resolved against the root.
    pub fn new(repo_root: PathBuf, serviceowners_file: &Path, services_file: &Path) -> Self {
        Self {
            serviceowners_path: repo_root.join(serviceowners_file),
            serviceowners_source: serviceowners_file.display().to_string(),
            services_path: repo_root.join(services_file),
            repo_root,
        }
    }

    /// Reads and parses the SERVICEOWNERS file.
    pub fn load_rules(&self) -> Result<RuleSet, LoadError> {
        if !self.serviceowners_path.is_file() {
            return Err(ConfigError::ServiceownersNotFound(self.serviceowners_path.clone()).into());
        }
        let text = std::fs::read_to_string(&self.serviceowners_path).map_err(ConfigError::Io)?;
        let rules = parse_rules(&text, &self.serviceowners_source)?;
        debug!(
            "Loaded {} rules from {}",
            rules.len(),
            self.serviceowners_path.display()
        );
        Ok(rules)
    }

    /// Loads service metadata. A missing file yields an empty catalog.
    pub fn load_services(&self) -> Result<ServiceCatalog, LoadError> {
        let services = load_services(&self.services_path)?;
        debug!(
            "Loaded {} services from {}",
            services.len(),
            self.services_path.display()
        );
        Ok(services)
    }
}

/// Errors loading the rule file or service metadata.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Services(#[from] ServicesError),
}

/// Resolves the GitHub token from the explicit value or `GH_TOKEN`.
pub fn resolve_github_token(explicit: Option<&str>) -> Option<SecretString> {
    explicit
        .map(str::to_owned)
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}

/// Creates an authenticated Octocrab client.
pub fn create_octocrab(base_url: &str, token: &SecretString) -> Result<Octocrab, ConfigError> {
    Octocrab::builder()
        .base_uri(base_url)
        .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?
        .personal_token(token.expose_secret().to_owned())
        .build()
        .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e)))
}

/// Splits an `owner/repo` string.
pub fn parse_repository(value: &str) -> Result<(String, String), ConfigError> {
    match value.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ConfigError::Invalid(format!(
            "GITHUB_REPOSITORY must be 'owner/repo', got '{}'",
            value
        ))),
    }
}
