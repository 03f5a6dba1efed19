//! CLI module for serviceowners.
//!
//! Argument parsing uses Clap with environment variable support so the same
//! binary can be driven from a terminal or from a GitHub Actions step, where
//! action inputs arrive as `INPUT_*` variables.

pub mod action;
pub mod commands;
pub mod config;
pub mod git;
pub mod github;
pub mod markdown;
pub mod output;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Map repository paths and diffs to the services that own them.
///
/// Ownership is declared in a CODEOWNERS-like `SERVICEOWNERS` file where each
/// rule assigns a path pattern to a service. The last matching rule wins.
#[derive(Parser, Debug)]
#[command(name = "sowners")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the SERVICEOWNERS file, relative to the repository root.
    #[arg(
        long,
        env = "SERVICEOWNERS_FILE",
        default_value = "SERVICEOWNERS",
        global = true
    )]
    pub serviceowners_file: PathBuf,

    /// Path to the service metadata file, relative to the repository root.
    #[arg(
        long,
        env = "SERVICEOWNERS_SERVICES_FILE",
        default_value = "services.yaml",
        global = true
    )]
    pub services_file: PathBuf,

    /// Repository root (defaults to the enclosing git checkout, else the
    /// current directory).
    #[arg(long, env = "SERVICEOWNERS_REPO_ROOT", global = true)]
    pub repo_root: Option<PathBuf>,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace).
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which service owns a path.
    #[command(visible_aliases = ["who", "owner"])]
    WhoOwns(WhoOwnsArgs),

    /// Show which services are impacted by a set of changed files.
    #[command(visible_alias = "impact")]
    Impacted(ImpactedArgs),

    /// Lint the SERVICEOWNERS file and service metadata.
    Lint(LintArgs),

    /// Draft a SERVICEOWNERS file from an existing CODEOWNERS file.
    Init(InitArgs),

    /// Run as a GitHub Action: summarize impact, lint and comment on the PR.
    Action(ActionArgs),
}

/// Output format shared by the reporting subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(ClapArgs, Debug)]
pub struct WhoOwnsArgs {
    /// Repository path to resolve (absolute paths under the root are accepted).
    pub path: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List every matching rule and mark the one that wins.
    #[arg(long)]
    pub explain: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ImpactedArgs {
    /// Git diff range, e.g. `origin/main...HEAD`.
    #[arg(long, env = "SERVICEOWNERS_DIFF", default_value = "HEAD~1...HEAD")]
    pub diff: String,

    /// Read changed paths from stdin (one per line) instead of running git.
    #[arg(long)]
    pub stdin: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List the changed files under each service.
    #[arg(long)]
    pub show_files: bool,

    /// Maximum files listed per service with --show-files.
    #[arg(long, default_value_t = 50)]
    pub max_files: usize,

    /// Exit with code 3 when some changed files have no owning service.
    #[arg(long)]
    pub fail_on_unmapped: bool,
}

#[derive(ClapArgs, Debug)]
pub struct LintArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Exit non-zero on warnings as well as errors.
    #[arg(long)]
    pub strict: bool,

    /// Report patterns that match no tracked file (runs git ls-files).
    #[arg(long)]
    pub check_matches: bool,

    /// Report tracked files claimed by rules of different services.
    #[arg(long)]
    pub check_overlaps: bool,
}

#[derive(ClapArgs, Debug)]
pub struct InitArgs {
    /// CODEOWNERS file to convert (defaults to the standard locations).
    #[arg(long)]
    pub codeowners: Option<PathBuf>,

    /// Write the draft to the SERVICEOWNERS file instead of stdout.
    #[arg(long)]
    pub write: bool,

    /// Overwrite an existing SERVICEOWNERS file with --write.
    #[arg(long)]
    pub force: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ActionArgs {
    /// Git diff range; derived from the triggering event when empty.
    #[arg(long, env = "INPUT_DIFF")]
    pub diff: Option<String>,

    /// Create or update a PR comment with the impact summary.
    #[arg(
        long,
        env = "INPUT_COMMENT",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub comment: bool,

    /// Exit with code 3 when some changed files have no owning service.
    #[arg(
        long,
        env = "INPUT_FAIL_ON_UNMAPPED",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub fail_on_unmapped: bool,

    /// Fail on lint warnings as well as errors.
    #[arg(
        long,
        env = "INPUT_STRICT_LINT",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub strict_lint: bool,

    /// GitHub token used to post the PR comment (falls back to GH_TOKEN).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise).
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Repository in 'owner/repo' format.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Name of the triggering event.
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Path to the triggering event payload.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// File receiving the job summary markdown.
    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    pub step_summary: Option<PathBuf>,

    /// File receiving step outputs.
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

impl ActionArgs {
    /// Returns the explicit diff range, ignoring blank values.
    pub fn diff_override(&self) -> Option<&str> {
        self.diff.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}
