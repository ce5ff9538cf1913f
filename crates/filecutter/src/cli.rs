//! Command-line entry point.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::lifecycle::Service;
use crate::app::mover::{BatchSummary, FileMover, Mover};
use crate::domain::errors::HookError;
use crate::domain::model::{MoveOutcome, MoveReport};
use crate::infra::config::Config;
use crate::infra::finder::FinderProvider;
use crate::infra::hook::SystemHook;

/// Exit status for configuration and usage errors.
const EXIT_FAILURE: u8 = 1;
/// Exit status when the keyboard hook cannot be brought up.
const EXIT_HOOK_UNAVAILABLE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "filecutter",
    author,
    version,
    about = "Cut files in Finder with a global shortcut and paste them into another folder"
)]
pub struct Cli {
    /// Additional config file layered over the built-in and user config
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Watch the keyboard for the cut and paste chords (default)
    Run,
    /// Move files into a directory with the same no-overwrite policy as paste
    Move {
        /// Files or folders to move
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Destination directory
        #[arg(long, value_name = "DIR")]
        to: PathBuf,
        /// Print one JSON record per file instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse arguments, run the requested command, and map failures to exit codes.
pub fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.downcast_ref::<HookError>().is_some() {
                ExitCode::from(EXIT_HOOK_UNAVAILABLE)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    crate::init(cli.log_level.as_deref().unwrap_or(config.logging.level()));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => listen(&config),
        Commands::Move { sources, to, json } => move_files(&sources, &to, json),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "filecutter", &mut io::stdout());
            Ok(())
        }
    }
}

fn listen(config: &Config) -> Result<()> {
    let mut service = Service::startup(
        config,
        SystemHook::new(),
        FinderProvider::from_settings(&config.finder),
        FileMover::new(),
    )?;
    let result = service.run();
    service.shutdown();
    result.map_err(anyhow::Error::from)
}

fn move_files(sources: &[PathBuf], destination: &Path, json: bool) -> Result<()> {
    let reports = FileMover::new().move_all(sources, destination);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        if json {
            let line = serde_json::to_string(report).context("failed to encode report")?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{}", render_report(report))?;
        }
    }
    if !json {
        writeln!(out, "{}", render_summary(&BatchSummary::from_reports(&reports)))?;
    }
    Ok(())
}

/// One human-readable line per move.
pub fn render_report(report: &MoveReport) -> String {
    let source = report.source.display();
    match (&report.outcome, &report.destination) {
        (MoveOutcome::Moved, Some(destination)) => {
            format!("moved: {source} -> {}", destination.display())
        }
        (MoveOutcome::Failed(reason), _) => format!("failed: {source} ({reason})"),
        (outcome, _) => format!("{outcome}: {source}"),
    }
}

pub fn render_summary(summary: &BatchSummary) -> String {
    format!(
        "{} moved, {} missing, {} already at destination, {} failed",
        summary.moved, summary.missing, summary.conflicts, summary.failed
    )
}
