//! GitHub Actions mode.
//!
//! Derives the diff range from the triggering event, computes impact and lint,
//! writes the job summary and step outputs, and keeps one PR comment current.

use crate::cli::ActionArgs;
use crate::cli::commands::CommandError;
use crate::cli::config::{
    ExitCode, ValidatedConfig, create_octocrab, parse_repository, resolve_github_token,
};
use crate::cli::git::{self, GitError};
use crate::cli::github::{OctocrabClient, upsert_pr_comment};
use crate::cli::markdown::{
    COMMENT_TITLE, DEFAULT_MARKER, ImpactMarkdownOptions, marker_comments, render_impact_comment,
    render_impact_markdown, render_lint_markdown,
};
use serde_json::Value;
use serviceowners_core::{
    ImpactReport, LintOptions, LintResult, OwnershipIndex, ServiceCatalog, compute_impact, lint,
    normalize_paths,
};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Diff used when neither an explicit range nor the event provides one.
pub const FALLBACK_DIFF: &str = "HEAD~1...HEAD";

/// Files listed per service in the job summary.
const SUMMARY_FILES_LIMIT: usize = 100;

const PULL_REQUEST_EVENTS: [&str; 2] = ["pull_request", "pull_request_target"];

/// The event that triggered the workflow run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GithubEvent {
    pub name: Option<String>,
    pub payload: Option<Value>,
}

impl GithubEvent {
    /// Loads the event payload. Needs both the name and the payload path; an
    /// unreadable or non-object payload is dropped.
    pub fn load(name: Option<&str>, path: Option<&Path>) -> Self {
        let (Some(name), Some(path)) = (name, path) else {
            return Self::default();
        };

        let payload = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));

        let payload = match payload {
            Ok(value) if value.is_object() => Some(value),
            Ok(_) => {
                warn!("Event payload at {} is not an object", path.display());
                None
            }
            Err(e) => {
                warn!("Could not read event payload {}: {}", path.display(), e);
                None
            }
        };

        Self {
            name: Some(name.to_string()),
            payload,
        }
    }

    fn is_pull_request(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| PULL_REQUEST_EVENTS.contains(&name))
    }

    fn payload_str(&self, pointer: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .pointer(pointer)?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// The range implied by the event: `base...head` for pull requests,
    /// `before...after` for pushes.
    pub fn diff_range(&self) -> Option<String> {
        let (from, to) = if self.is_pull_request() {
            ("/pull_request/base/sha", "/pull_request/head/sha")
        } else if self.name.as_deref() == Some("push") {
            ("/before", "/after")
        } else {
            return None;
        };
        Some(format!(
            "{}...{}",
            self.payload_str(from)?,
            self.payload_str(to)?
        ))
    }

    /// The pull request number, for pull request events only.
    pub fn pr_number(&self) -> Option<u64> {
        if !self.is_pull_request() {
            return None;
        }
        self.payload.as_ref()?.get("number")?.as_u64()
    }
}

/// Picks the diff range: explicit input, then the event, then the last commit.
pub fn determine_diff(explicit: Option<&str>, event: &GithubEvent) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| event.diff_range())
        .unwrap_or_else(|| FALLBACK_DIFF.to_string())
}

/// Everything computed for one action run.
#[derive(Debug)]
pub struct ActionRun {
    pub diff: String,
    pub event: GithubEvent,
    pub report: ImpactReport,
    pub lint: LintResult,
    pub services: ServiceCatalog,
}

impl ActionRun {
    /// Loads the rules, resolves the diff and computes impact and lint.
    ///
    /// `changed_files` lists the files changed in a diff range.
    pub fn prepare<F>(
        config: &ValidatedConfig,
        args: &ActionArgs,
        changed_files: F,
    ) -> Result<Self, CommandError>
    where
        F: FnOnce(&str) -> Result<Vec<String>, GitError>,
    {
        let rules = config.load_rules()?;
        let services = config.load_services()?;

        let event = GithubEvent::load(args.event_name.as_deref(), args.event_path.as_deref());
        let diff = determine_diff(args.diff_override(), &event);
        info!("Computing impact for {}", diff);

        let changed = changed_files(&diff).map_err(|source| CommandError::Diff {
            diff: diff.clone(),
            source,
        })?;
        let changed = normalize_paths(changed, Some(config.repo_root.as_path()));

        let lint = lint(&rules, Some(&services), &LintOptions::default(), None)?;
        let report = compute_impact(&OwnershipIndex::new(rules), &changed);

        Ok(Self {
            diff,
            event,
            report,
            lint,
            services,
        })
    }

    /// Job summary: diff, detailed impact and lint.
    pub fn summary_markdown(&self) -> String {
        let options = ImpactMarkdownOptions {
            include_files: true,
            max_files_per_service: SUMMARY_FILES_LIMIT,
            ..Default::default()
        };
        format!(
            "_Diff_: `{}`\n\n{}\n{}",
            self.diff,
            render_impact_markdown(&self.report, &self.services, &options),
            render_lint_markdown(&self.lint, "Lint")
        )
    }

    /// The pull request comment body.
    pub fn comment_body(&self) -> String {
        render_impact_comment(&self.report, &self.services, DEFAULT_MARKER, COMMENT_TITLE)
    }

    /// Appends the job summary. Failures are logged, never fatal.
    pub fn write_step_summary(&self, path: &Path) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| f.write_all(self.summary_markdown().as_bytes()));
        if let Err(e) = result {
            warn!("Could not write step summary {}: {}", path.display(), e);
        }
    }

    /// Appends `impacted_services` and `unmapped_files` as JSON step outputs.
    pub fn write_outputs(&self, path: &Path) -> io::Result<()> {
        let impacted =
            serde_json::to_string(&self.report.impacted_services()).map_err(io::Error::other)?;
        let unmapped =
            serde_json::to_string(&self.report.unmapped_files).map_err(io::Error::other)?;

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "impacted_services={}", impacted)?;
        writeln!(file, "unmapped_files={}", unmapped)?;
        Ok(())
    }

    /// Lint failures take precedence over unmapped files.
    pub fn exit_code(&self, args: &ActionArgs) -> ExitCode {
        if self.lint.fails(args.strict_lint) {
            ExitCode::Failure
        } else if args.fail_on_unmapped && self.report.has_unmapped() {
            ExitCode::Unmapped
        } else {
            ExitCode::Success
        }
    }
}

/// Runs the action end to end.
pub async fn run_action(
    config: &ValidatedConfig,
    args: &ActionArgs,
) -> Result<ExitCode, CommandError> {
    let run = ActionRun::prepare(config, args, |diff| {
        git::diff_name_only(&config.repo_root, diff)
    })?;
    debug!(
        "{} impacted service(s), {} unmapped file(s), {} lint issue(s)",
        run.report.services_to_files.len(),
        run.report.unmapped_files.len(),
        run.lint.issues.len()
    );

    if let Some(path) = &args.step_summary {
        run.write_step_summary(path);
    }
    if let Some(path) = &args.github_output
        && let Err(e) = run.write_outputs(path)
    {
        warn!("Could not write step outputs {}: {}", path.display(), e);
    }

    if args.comment {
        let token = resolve_github_token(args.github_token.as_deref());
        match (run.event.pr_number(), token) {
            (Some(number), Some(token)) => {
                let (owner, repo) = parse_repository(args.repository.as_deref().unwrap_or(""))?;
                let client = OctocrabClient::new(create_octocrab(&args.github_api_url, &token)?);
                let (marker, _) = marker_comments(DEFAULT_MARKER);
                upsert_pr_comment(&client, &owner, &repo, number, &run.comment_body(), &marker)
                    .await?;
            }
            (None, _) => info!("Not a pull request event; skipping PR comment"),
            (_, None) => info!("No GitHub token; skipping PR comment"),
        }
    }

    Ok(run.exit_code(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn event(name: &str, payload: Value) -> GithubEvent {
        GithubEvent {
            name: Some(name.to_string()),
            payload: Some(payload),
        }
    }

    fn action_args(extra: &[&str]) -> ActionArgs {
        let mut argv = vec!["sowners", "action"];
        argv.extend_from_slice(extra);
        match Args::parse_from(argv).command {
            Command::Action(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn create_test_repo(rules: &str) -> (TempDir, ValidatedConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("SERVICEOWNERS"), rules).unwrap();
        fs::write(
            dir.path().join("services.yaml"),
            "api:\n  owners: ['@acme/api']\ndocs:\n  owners: [bob]\n",
        )
        .unwrap();
        let config = ValidatedConfig::new(
            dir.path().to_path_buf(),
            Path::new("SERVICEOWNERS"),
            Path::new("services.yaml"),
        );
        (dir, config)
    }

    #[test]
    fn test_pull_request_diff_and_number() {
        let event = event(
            "pull_request",
            serde_json::json!({
                "number": 17,
                "pull_request": {"base": {"sha": "aaa"}, "head": {"sha": "bbb"}}
            }),
        );
        assert_eq!(event.diff_range().as_deref(), Some("aaa...bbb"));
        assert_eq!(event.pr_number(), Some(17));
    }

    #[test]
    fn test_push_diff_has_no_number() {
        let event = event(
            "push",
            serde_json::json!({"before": "111", "after": "222", "number": 3}),
        );
        assert_eq!(event.diff_range().as_deref(), Some("111...222"));
        assert_eq!(event.pr_number(), None);
    }

    #[test]
    fn test_diff_precedence() {
        let pr = event(
            "pull_request_target",
            serde_json::json!({"pull_request": {"base": {"sha": "a"}, "head": {"sha": "b"}}}),
        );
        assert_eq!(determine_diff(Some("x...y"), &pr), "x...y");
        assert_eq!(determine_diff(None, &pr), "a...b");

        let incomplete = event("pull_request", serde_json::json!({"pull_request": {}}));
        assert_eq!(determine_diff(None, &incomplete), FALLBACK_DIFF);

        let other = event("workflow_dispatch", serde_json::json!({}));
        assert_eq!(determine_diff(None, &other), FALLBACK_DIFF);
        assert_eq!(determine_diff(None, &GithubEvent::default()), FALLBACK_DIFF);
    }

    #[test]
    fn test_load_event() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, r#"{"number": 5}"#).unwrap();

        let loaded = GithubEvent::load(Some("pull_request"), Some(path.as_path()));
        assert_eq!(loaded.pr_number(), Some(5));

        assert_eq!(GithubEvent::load(None, Some(path.as_path())), GithubEvent::default());

        fs::write(&path, "[1, 2]").unwrap();
        let loaded = GithubEvent::load(Some("push"), Some(path.as_path()));
        assert_eq!(loaded.name.as_deref(), Some("push"));
        assert!(loaded.payload.is_none());

        let loaded = GithubEvent::load(Some("push"), Some(&dir.path().join("missing.json")));
        assert!(loaded.payload.is_none());
    }

    #[test]
    fn test_prepare_and_outputs() {
        let (dir, config) = create_test_repo("apps/api/** api\n*.md docs\n");
        let args = action_args(&["--diff", "base...head"]);

        let run = ActionRun::prepare(&config, &args, |diff| {
            assert_eq!(diff, "base...head");
            Ok(vec![
                "apps/api/main.rs".to_string(),
                "./README.md".to_string(),
                "Makefile".to_string(),
            ])
        })
        .unwrap();

        assert_eq!(run.report.impacted_services(), vec!["api", "docs"]);
        assert_eq!(run.report.unmapped_files, vec!["Makefile"]);

        let outputs = dir.path().join("output.txt");
        fs::write(&outputs, "existing=1\n").unwrap();
        run.write_outputs(&outputs).unwrap();
        assert_eq!(
            fs::read_to_string(&outputs).unwrap(),
            "existing=1\nimpacted_services=[\"api\",\"docs\"]\nunmapped_files=[\"Makefile\"]\n"
        );

        let summary = dir.path().join("summary.md");
        run.write_step_summary(&summary);
        let summary = fs::read_to_string(&summary).unwrap();
        assert!(summary.starts_with("_Diff_: `base...head`\n\n## ServiceOwners\n"));
        assert!(summary.contains("  - `apps/api/main.rs`"));
        assert!(summary.contains("### Lint\n\n✅ No lint issues found.\n"));

        assert!(run.comment_body().starts_with("<!-- serviceowners:begin -->"));
    }

    #[test]
    fn test_diff_failure_mentions_fetch_depth() {
        let (_dir, config) = create_test_repo("apps/** api\n");
        let args = action_args(&["--diff", "a...b"]);

        let err = ActionRun::prepare(&config, &args, |_| {
            Err(GitError::Failed {
                args: "diff --name-only a...b".to_string(),
                message: "fatal: bad revision".to_string(),
            })
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unable to compute git diff 'a...b'"));
        assert!(message.contains("fetch-depth: 0"));
    }

    #[test]
    fn test_exit_codes() {
        let (_dir, config) = create_test_repo("src/** api\nsrc/** web\n");
        let changed = || -> Result<Vec<String>, GitError> { Ok(vec!["Makefile".to_string()]) };

        let args = action_args(&["--diff", "a...b"]);
        let run = ActionRun::prepare(&config, &args, |_| changed()).unwrap();
        // Duplicate pattern is a warning; unmapped fails.
        assert_eq!(run.exit_code(&args), ExitCode::Unmapped);

        let args = action_args(&["--diff", "a...b", "--strict-lint", "true"]);
        assert_eq!(run.exit_code(&args), ExitCode::Failure);

        let args = action_args(&["--diff", "a...b", "--fail-on-unmapped", "false"]);
        assert_eq!(run.exit_code(&args), ExitCode::Success);
    }
}
