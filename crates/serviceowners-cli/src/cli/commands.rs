//! Subcommand implementations.
//!
//! Each command writes to the given writer and returns the exit code; errors
//! are reported by the caller.

use crate::cli::config::{ConfigError, ExitCode, LoadError, ValidatedConfig};
use crate::cli::git::{self, GitError, GitFileLister};
use crate::cli::github::GithubError;
use crate::cli::markdown::{ImpactMarkdownOptions, render_impact_markdown};
use crate::cli::output::{HumanOutput, ImpactedJson, LintJson, WhoOwnsJson, write_json};
use crate::cli::{ImpactedArgs, InitArgs, LintArgs, OutputFormat, WhoOwnsArgs};
use serviceowners_core::{
    LintError, LintOptions, OwnershipIndex, bootstrap_from_codeowners, compute_impact,
    find_codeowners_file, lint, normalize_paths, normalize_repo_path,
};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Invalid invocation.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Git(#[from] GitError),

    /// The changed files of a diff range could not be computed.
    #[error(
        "Unable to compute git diff '{diff}': {source}\n\
         If this is running in GitHub Actions, ensure actions/checkout uses fetch-depth: 0."
    )]
    Diff { diff: String, source: GitError },

    #[error(transparent)]
    Lint(#[from] LintError),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Prefix used when reporting the error.
    pub fn label(&self) -> &'static str {
        match self {
            CommandError::Load(LoadError::Parse(_)) => "parse error",
            CommandError::Git(_) => "git error",
            _ => "error",
        }
    }
}

/// `who-owns`: resolve one path.
pub fn who_owns<W: Write>(
    config: &ValidatedConfig,
    args: &WhoOwnsArgs,
    writer: &mut W,
    use_colors: bool,
) -> Result<ExitCode, CommandError> {
    let index = OwnershipIndex::new(config.load_rules()?);
    let services = config.load_services()?;

    let path = normalize_repo_path(&args.path, Some(config.repo_root.as_path()));
    let m = index.match_path(&path);
    let metadata = m.service().and_then(|s| services.get(s));
    debug!("{} resolved to {:?}", path, m.service());

    match args.format {
        OutputFormat::Json => write_json(writer, &WhoOwnsJson::new(&m, metadata))?,
        OutputFormat::Text => {
            HumanOutput::new(writer, use_colors).write_who_owns(&m, metadata, args.explain)?
        }
    }
    Ok(ExitCode::Success)
}

/// Reads changed paths for `impacted`: stdin lines or `git diff --name-only`.
pub fn collect_changed_files(
    config: &ValidatedConfig,
    args: &ImpactedArgs,
) -> Result<Vec<String>, CommandError> {
    if args.stdin {
        let text = io::read_to_string(io::stdin())?;
        Ok(text.lines().map(str::to_string).collect())
    } else {
        Ok(git::diff_name_only(&config.repo_root, &args.diff)?)
    }
}

/// `impacted`: group changed files by owning service.
pub fn impacted<W: Write>(
    config: &ValidatedConfig,
    args: &ImpactedArgs,
    changed: Vec<String>,
    writer: &mut W,
) -> Result<ExitCode, CommandError> {
    let index = OwnershipIndex::new(config.load_rules()?);
    let services = config.load_services()?;

    let changed = normalize_paths(changed, Some(config.repo_root.as_path()));
    let report = compute_impact(&index, &changed);
    info!(
        "{} changed file(s) across {} service(s)",
        report.total_files(),
        report.services_to_files.len()
    );

    match args.format {
        OutputFormat::Json => {
            let diff = (!args.stdin).then_some(args.diff.as_str());
            write_json(writer, &ImpactedJson::new(&report, diff))?;
        }
        OutputFormat::Text => {
            let options = ImpactMarkdownOptions {
                title: "Impacted services",
                include_files: args.show_files,
                max_files_per_service: args.max_files,
                ..Default::default()
            };
            writeln!(writer, "{}", render_impact_markdown(&report, &services, &options))?;
        }
    }

    if args.fail_on_unmapped && report.has_unmapped() {
        return Ok(ExitCode::Unmapped);
    }
    Ok(ExitCode::Success)
}

/// `lint`: check the rule file and service metadata.
pub fn lint_command<W: Write>(
    config: &ValidatedConfig,
    args: &LintArgs,
    writer: &mut W,
    use_colors: bool,
) -> Result<ExitCode, CommandError> {
    let rules = config.load_rules()?;
    let services = config.load_services()?;

    // Severities are reported as found. `--strict` only changes the exit code.
    let options = LintOptions::new()
        .with_check_matches(args.check_matches)
        .with_check_overlaps(args.check_overlaps);
    let lister = GitFileLister::new(&config.repo_root);
    let result = lint(&rules, Some(&services), &options, Some(&lister))?;

    match args.format {
        OutputFormat::Json => write_json(writer, &LintJson::new(&result))?,
        OutputFormat::Text => HumanOutput::new(writer, use_colors).write_lint_result(&result)?,
    }

    if result.fails(args.strict) {
        return Ok(ExitCode::Failure);
    }
    Ok(ExitCode::Success)
}

/// `init`: draft a SERVICEOWNERS file from CODEOWNERS.
pub fn init<W: Write>(
    config: &ValidatedConfig,
    args: &InitArgs,
    writer: &mut W,
) -> Result<ExitCode, CommandError> {
    let codeowners = match &args.codeowners {
        Some(path) => Some(path.clone()).filter(|p| p.is_file()),
        None => find_codeowners_file(&config.repo_root),
    }
    .ok_or_else(|| CommandError::Usage("CODEOWNERS file not found (use --codeowners PATH)".into()))?;

    info!("Drafting SERVICEOWNERS from {}", codeowners.display());
    let draft = bootstrap_from_codeowners(&std::fs::read_to_string(&codeowners)?);

    if !args.write {
        write!(writer, "{}", draft)?;
        return Ok(ExitCode::Success);
    }

    let target: &Path = &config.serviceowners_path;
    if target.exists() && !args.force {
        return Err(CommandError::Usage(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }
    std::fs::write(target, draft)?;
    writeln!(writer, "Wrote {}", target.display())?;
    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const RULES: &str = "\
# pattern      service
*.py           core
src/**         platform
docs/          docs
";

    fn create_test_repo() -> (TempDir, ValidatedConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("SERVICEOWNERS"), RULES).unwrap();
        fs::write(
            dir.path().join("services.yaml"),
            "\
services:
  platform:
    owners: ['@acme/platform']
    contact:
      slack: '#platform'
  core:
    owners: [alice]
",
        )
        .unwrap();
        let config = ValidatedConfig::new(
            dir.path().to_path_buf(),
            Path::new("SERVICEOWNERS"),
            Path::new("services.yaml"),
        );
        (dir, config)
    }

    fn command(argv: &[&str]) -> Command {
        let mut full = vec!["sowners"];
        full.extend_from_slice(argv);
        Args::parse_from(full).command
    }

    fn run_to_string<F>(f: F) -> (ExitCode, String)
    where
        F: FnOnce(&mut Vec<u8>) -> Result<ExitCode, CommandError>,
    {
        let mut buf = Vec::new();
        let code = f(&mut buf).unwrap();
        (code, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_who_owns_text() {
        let (_dir, config) = create_test_repo();
        let Command::WhoOwns(args) = command(&["who-owns", "src/main.py", "--explain"]) else {
            panic!("expected who-owns");
        };
        let (code, out) = run_to_string(|w| who_owns(&config, &args, w, false));

        assert_eq!(code, ExitCode::Success);
        assert!(out.starts_with("src/main.py: platform\n  owners: @acme/platform\n  slack: #platform\n"));
        assert!(out.contains("- src/** -> platform (SERVICEOWNERS:3)  <== chosen"));
    }

    #[test]
    fn test_who_owns_absolute_path_json() {
        let (dir, config) = create_test_repo();
        let absolute = dir.path().join("docs/guide.md");
        let Command::WhoOwns(args) = command(&[
            "who-owns",
            absolute.to_str().unwrap(),
            "--format",
            "json",
        ]) else {
            panic!("expected who-owns");
        };
        let (_, out) = run_to_string(|w| who_owns(&config, &args, w, false));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["path"], "docs/guide.md");
        assert_eq!(value["service"], "docs");
    }

    #[test]
    fn test_impacted_text_and_unmapped_exit() {
        let (_dir, config) = create_test_repo();
        let Command::Impacted(args) =
            command(&["impacted", "--stdin", "--show-files", "--fail-on-unmapped"])
        else {
            panic!("expected impacted");
        };
        let changed = vec![
            "src/a.rs".to_string(),
            "".to_string(),
            "tools/gen.py".to_string(),
            "Makefile".to_string(),
        ];
        let (code, out) = run_to_string(|w| impacted(&config, &args, changed, w));

        assert_eq!(code, ExitCode::Unmapped);
        assert!(out.starts_with("## Impacted services\n"));
        assert!(out.contains("### Impacted services (2)"));
        assert!(out.contains("  - `tools/gen.py`"));
        assert!(out.contains("### Unmapped files (1)"));
    }

    #[test]
    fn test_impacted_json() {
        let (_dir, config) = create_test_repo();
        let Command::Impacted(args) =
            command(&["impacted", "--diff", "a...b", "--format", "json"])
        else {
            panic!("expected impacted");
        };
        let changed = vec!["src/a.rs".to_string(), "src/b.py".to_string()];
        let (code, out) = run_to_string(|w| impacted(&config, &args, changed, w));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(code, ExitCode::Success);
        assert_eq!(value["diff"], "a...b");
        assert_eq!(value["impacted_services"], serde_json::json!(["platform"]));
        assert_eq!(value["services"]["platform"]["count"], 2);
        assert_eq!(value["total_files"], 2);
    }

    #[test]
    fn test_lint_clean_and_strict() {
        let (dir, config) = create_test_repo();
        let Command::Lint(args) = command(&["lint"]) else {
            panic!("expected lint");
        };
        // `docs` has no metadata: a warning only.
        let (code, out) = run_to_string(|w| lint_command(&config, &args, w, false));
        assert_eq!(code, ExitCode::Success);
        assert!(out.contains("[WARN] UNKNOWN_SERVICE SERVICEOWNERS:4"));

        let Command::Lint(args) = command(&["lint", "--strict", "--format", "json"]) else {
            panic!("expected lint");
        };
        let (code, out) = run_to_string(|w| lint_command(&config, &args, w, false));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(code, ExitCode::Failure);
        assert_eq!(value["issues"][0]["severity"], "WARN");

        fs::write(
            dir.path().join("services.yaml"),
            "platform: {owners: [a]}\ncore: {owners: [b]}\ndocs: {owners: [c]}\n",
        )
        .unwrap();
        let (code, out) = run_to_string(|w| lint_command(&config, &args, w, false));
        assert_eq!(code, ExitCode::Success);
        assert!(out.contains("\"issues\": []"));
    }

    #[test]
    fn test_missing_serviceowners() {
        let dir = TempDir::new().unwrap();
        let config = ValidatedConfig::new(
            dir.path().to_path_buf(),
            Path::new("SERVICEOWNERS"),
            Path::new("services.yaml"),
        );
        let Command::Lint(args) = command(&["lint"]) else {
            panic!("expected lint");
        };
        let err = lint_command(&config, &args, &mut Vec::new(), false).unwrap_err();
        assert_eq!(err.label(), "error");
        assert!(err.to_string().contains("SERVICEOWNERS file not found"));
    }

    #[test]
    fn test_parse_error_label() {
        let (dir, config) = create_test_repo();
        fs::write(dir.path().join("SERVICEOWNERS"), "src/** api web\n").unwrap();
        let Command::Lint(args) = command(&["lint"]) else {
            panic!("expected lint");
        };
        let err = lint_command(&config, &args, &mut Vec::new(), false).unwrap_err();
        assert_eq!(err.label(), "parse error");
        assert!(err.to_string().starts_with("SERVICEOWNERS:1:"));
    }

    #[test]
    fn test_init_prints_and_writes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".github")).unwrap();
        fs::write(
            dir.path().join(".github/CODEOWNERS"),
            "/apps/api/ @acme/api-team\n*.md @acme/docs\n",
        )
        .unwrap();
        let config = ValidatedConfig::new(
            dir.path().to_path_buf(),
            Path::new("SERVICEOWNERS"),
            Path::new("services.yaml"),
        );

        let Command::Init(args) = command(&["init"]) else {
            panic!("expected init");
        };
        let (_, out) = run_to_string(|w| init(&config, &args, w));
        assert!(out.contains("/apps/api/\tapi\n*.md\tdocs\n"));
        assert!(!config.serviceowners_path.exists());

        let Command::Init(args) = command(&["init", "--write"]) else {
            panic!("expected init");
        };
        let (_, out) = run_to_string(|w| init(&config, &args, w));
        assert!(out.starts_with("Wrote "));
        assert!(config.load_rules().is_ok());

        let err = init(&config, &args, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("already exists (use --force to overwrite)"));

        let Command::Init(args) = command(&["init", "--write", "--force"]) else {
            panic!("expected init");
        };
        assert!(init(&config, &args, &mut Vec::new()).is_ok());
    }

    #[test]
    fn test_init_without_codeowners() {
        let dir = TempDir::new().unwrap();
        let config = ValidatedConfig::new(
            dir.path().to_path_buf(),
            Path::new("SERVICEOWNERS"),
            Path::new("services.yaml"),
        );
        let Command::Init(args) = command(&["init"]) else {
            panic!("expected init");
        };
        let err = init(&config, &args, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
    }
}
