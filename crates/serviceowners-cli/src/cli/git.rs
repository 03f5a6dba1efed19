//! Thin wrapper around the `git` executable.
//!
//! Only three commands are needed: locating the checkout root, listing the
//! files changed in a diff range and listing tracked files.

use serviceowners_core::{FileListError, FileLister, normalize_repo_path};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors running git.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable could not be found.
    #[error("git not found on PATH")]
    NotFound,

    /// git ran but exited unsuccessfully.
    #[error("git {args} failed: {message}")]
    Failed { args: String, message: String },

    /// git could not be started.
    #[error("failed to run git: {0}")]
    Io(io::Error),
}

fn run_git(cwd: &Path, args: &[&str]) -> Result<Vec<u8>, GitError> {
    trace!("Running git {} in {}", args.join(" "), cwd.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => GitError::NotFound,
            _ => GitError::Io(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        return Err(GitError::Failed {
            args: args.join(" "),
            message,
        });
    }

    Ok(output.stdout)
}

/// Returns the root of the git checkout containing `cwd`.
pub fn find_repo_root(cwd: &Path) -> Result<PathBuf, GitError> {
    let stdout = run_git(cwd, &["rev-parse", "--show-toplevel"])?;
    let root = String::from_utf8_lossy(&stdout).trim().to_string();
    debug!("Found git checkout at {}", root);
    Ok(PathBuf::from(root))
}

/// Returns the files changed in `range` (e.g. `base...head`), normalized.
pub fn diff_name_only(repo_root: &Path, range: &str) -> Result<Vec<String>, GitError> {
    let stdout = run_git(repo_root, &["diff", "--name-only", range])?;
    let files = split_lines(&String::from_utf8_lossy(&stdout));
    debug!("git diff {} reported {} changed files", range, files.len());
    Ok(files)
}

/// Returns every file tracked by git, normalized.
pub fn ls_files(repo_root: &Path) -> Result<Vec<String>, GitError> {
    let stdout = run_git(repo_root, &["ls-files", "-z"])?;
    let files = split_nul(&stdout);
    debug!("git ls-files reported {} tracked files", files.len());
    Ok(files)
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| normalize_repo_path(line, None))
        .collect()
}

fn split_nul(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| normalize_repo_path(&String::from_utf8_lossy(entry), None))
        .collect()
}

/// A [`FileLister`] backed by `git ls-files`.
#[derive(Debug, Clone)]
pub struct GitFileLister {
    repo_root: PathBuf,
}

impl GitFileLister {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl FileLister for GitFileLister {
    fn list_files(&self) -> Result<Vec<String>, FileListError> {
        ls_files(&self.repo_root).map_err(|e| FileListError::backend("git ls-files", e.to_string()))
    }
}
