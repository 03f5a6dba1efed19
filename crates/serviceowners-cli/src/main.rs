//! ServiceOwners CLI
//!
//! A command-line tool for mapping repository paths and diffs to the services
//! that own them.

use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode as StdExitCode;
use tokio::signal;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::action::run_action;
use cli::commands;
use cli::config::{ExitCode, ValidatedConfig};
use cli::output::HumanOutput;
use cli::{Args, Command, OutputFormat};

#[tokio::main]
async fn main() -> StdExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose);

    // Stop on SIGINT/SIGTERM, whatever the command is doing
    let exit_code = tokio::select! {
        code = run(args) => code,
        _ = shutdown_signal() => ExitCode::Terminated,
    };

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Initialize tracing based on verbosity level.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["octocrab=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Run the selected subcommand.
async fn run(args: Args) -> ExitCode {
    let mut stderr = io::stderr();
    let err_colors = stderr.is_terminal();

    // Validate configuration
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            write_error(&mut stderr, "error", &e.to_string(), err_colors);
            return ExitCode::Failure;
        }
    };

    debug!("Validated configuration: {:?}", config);
    info!("Repository root: {}", config.repo_root.display());

    let mut stdout = io::stdout();
    let use_colors = stdout.is_terminal();

    let result = match &args.command {
        Command::WhoOwns(who) => {
            let colors = use_colors && who.format == OutputFormat::Text;
            commands::who_owns(&config, who, &mut stdout, colors)
        }
        Command::Impacted(impacted) => commands::collect_changed_files(&config, impacted)
            .and_then(|changed| commands::impacted(&config, impacted, changed, &mut stdout)),
        Command::Lint(lint) => {
            let colors = use_colors && lint.format == OutputFormat::Text;
            commands::lint_command(&config, lint, &mut stdout, colors)
        }
        Command::Init(init) => commands::init(&config, init, &mut stdout),
        Command::Action(action) => run_action(&config, action).await,
    };

    let _ = stdout.flush();

    match result {
        Ok(code) => code,
        Err(e) => {
            write_error(&mut stderr, e.label(), &e.to_string(), err_colors);
            ExitCode::Failure
        }
    }
}

/// Write an error message to the writer.
fn write_error<W: Write>(writer: &mut W, label: &str, message: &str, use_colors: bool) {
    let _ = HumanOutput::new(writer, use_colors).write_error(label, message);
}
