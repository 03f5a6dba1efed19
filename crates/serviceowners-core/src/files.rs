//! Sources of tracked repository files.
//!
//! The opt-in lint checks need the set of files in the repository. Where that
//! set comes from is a seam: `git ls-files` in the CLI, a directory walk, or
//! a fixed list in tests.

use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An error while listing repository files.
#[derive(Debug, Error)]
pub enum FileListError {
    /// The repository root is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// The file listing backend failed.
    #[error("{lister} failed: {message}")]
    Backend { lister: String, message: String },
}

impl FileListError {
    /// Creates a backend failure error.
    pub fn backend(lister: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            lister: lister.into(),
            message: message.into(),
        }
    }
}

/// Lists the files of a repository as normalized, `/`-separated relative paths.
pub trait FileLister {
    /// Returns every tracked file.
    fn list_files(&self) -> Result<Vec<String>, FileListError>;
}

/// A fixed, in-memory list of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFileList {
    files: Vec<String>,
}

impl StaticFileList {
    pub fn new<I>(files: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

impl FileLister for StaticFileList {
    fn list_files(&self) -> Result<Vec<String>, FileListError> {
        Ok(self.files.clone())
    }
}

/// Lists files by walking a directory tree.
///
/// Hidden files are included so `.github/` and friends are visible. The
/// `.git` directory is always skipped. `.gitignore` rules are honoured by
/// default, with or without an enclosing git repository.
#[derive(Debug, Clone)]
pub struct WalkFileLister {
    root: PathBuf,
    respect_gitignore: bool,
}

impl WalkFileLister {
    /// Creates a lister rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
        }
    }

    /// Sets whether to respect `.gitignore` rules.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// The directory being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileLister for WalkFileLister {
    fn list_files(&self) -> Result<Vec<String>, FileListError> {
        if !self.root.is_dir() {
            return Err(FileListError::NotADirectory {
                path: self.root.clone(),
            });
        }

        debug!(
            "Walking {:?} (gitignore={})",
            self.root, self.respect_gitignore
        );

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .ignore(false)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .follow_links(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if let Ok(relative) = entry.path().strip_prefix(&self.root)
                && let Some(path_str) = relative.to_str()
            {
                files.push(path_str.replace('\\', "/"));
            }
        }

        files.sort();
        debug!("Found {} files", files.len());
        trace!("Files: {:?}", files);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn setup_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        File::create(dir.path().join("src/main.rs")).unwrap();
        fs::create_dir_all(dir.path().join(".github/workflows")).unwrap();
        File::create(dir.path().join(".github/workflows/ci.yml")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        File::create(dir.path().join(".git/HEAD")).unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        File::create(dir.path().join("target/out.bin")).unwrap();
        fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
        dir
    }

    #[test]
    fn static_list_returns_its_files() {
        let lister = StaticFileList::new(["a.rs", "b/c.rs"]);
        assert_eq!(lister.list_files().unwrap(), vec!["a.rs", "b/c.rs"]);
    }

    #[test]
    fn walk_includes_hidden_and_skips_git() {
        let dir = setup_repo();
        let files = WalkFileLister::new(dir.path()).list_files().unwrap();

        assert!(files.contains(&"src/main.rs".to_string()));
        assert!(files.contains(&".github/workflows/ci.yml".to_string()));
        assert!(files.contains(&".gitignore".to_string()));
        assert!(!files.iter().any(|f| f.starts_with(".git/")));
    }

    #[test]
    fn walk_respects_gitignore() {
        let dir = setup_repo();
        let files = WalkFileLister::new(dir.path()).list_files().unwrap();
        assert!(!files.contains(&"target/out.bin".to_string()));

        let files = WalkFileLister::new(dir.path())
            .with_gitignore(false)
            .list_files()
            .unwrap();
        assert!(files.contains(&"target/out.bin".to_string()));
    }

    #[test]
    fn walk_output_is_sorted_files_only() {
        let dir = setup_repo();
        let files = WalkFileLister::new(dir.path()).list_files().unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert!(!files.contains(&"src".to_string()));
    }

    #[test]
    fn walk_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let err = WalkFileLister::new(dir.path().join("nope"))
            .list_files()
            .unwrap_err();
        assert!(matches!(err, FileListError::NotADirectory { .. }));
    }
}
