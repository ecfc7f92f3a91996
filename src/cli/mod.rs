//! CLI argument parsing and command dispatch.
//!
//! This module is the entry point for the `ipa-results` binary. It parses
//! command-line arguments via `clap`, loads the layered configuration, and
//! runs the requested command against a [`Reporter`] on stdout.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | Command succeeded |
//! | 1    | Handled failure (unreadable file, bad results json, ...) |
//! | 2    | Usage error (reported by clap) |

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::config::{CliOverrides, ResultsConfig};
use crate::history;
use crate::reporting::Reporter;
use crate::ReportError;

const EXIT_OK: i32 = 0;

// ---------------------------------------------------------------------------
// Clap argument definitions
// ---------------------------------------------------------------------------

/// Show cloud image test results, logs, and history
#[derive(Parser, Debug)]
#[command(name = "ipa-results", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Show run info and per-test outcomes
    #[arg(short, long, global = true)]
    verbose: bool,

    /// History log to read [default: ~/ipa/results/.history]
    #[arg(long, global = true, value_name = "PATH")]
    history_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the summary of a results file
    Show(ShowArgs),
    /// Print a results log file
    Log {
        #[arg(value_name = "LOG_FILE")]
        path: PathBuf,
    },
    /// Print the results history log
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Create a default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Results file to show
    #[arg(
        value_name = "RESULTS_FILE",
        required_unless_present = "item",
        conflicts_with = "item"
    )]
    results_file: Option<PathBuf>,

    /// Show the N-th most recent run from the history log (1 = latest)
    #[arg(short, long, value_name = "N")]
    item: Option<usize>,

    /// Also print the run log stored next to the results file
    #[arg(long)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// Append a results file to the history log
    Add {
        #[arg(value_name = "RESULTS_FILE")]
        results_file: PathBuf,
    },
}

impl Cli {
    fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            no_color: self.no_color,
            verbose: self.verbose,
            history_log: self.history_log.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse CLI arguments and run the requested command. Returns an exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    let mut reporter = Reporter::stdout();
    run_cli(cli, io::stdout().is_terminal(), &mut reporter)
}

/// Runs `cli` against `reporter`. Output that is not going to a terminal is
/// never colored.
fn run_cli<W: Write>(cli: Cli, is_terminal: bool, reporter: &mut Reporter<W>) -> i32 {
    let mut overrides = cli.to_overrides();
    if !is_terminal {
        overrides.no_color = true;
    }

    // Without a config, the flag alone decides how errors are styled.
    let (no_color, result) = match ResultsConfig::load() {
        Ok(mut config) => {
            config.apply_overrides(&overrides);
            (config.output.no_color, execute(&cli.command, &config, reporter))
        }
        Err(e) => (overrides.no_color, Err(e)),
    };

    let code = match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            debug!(error = ?e, "command failed");
            if let Err(write_err) = reporter.echo_error(&e, no_color) {
                eprintln!("ipa-results error: {write_err}");
            }
            e.exit_code()
        }
    };
    if let Err(e) = reporter.flush() {
        eprintln!("ipa-results error: {e}");
    }
    code
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn execute<W: Write>(
    command: &Command,
    config: &ResultsConfig,
    reporter: &mut Reporter<W>,
) -> Result<(), ReportError> {
    let no_color = config.output.no_color;
    let verbose = config.output.verbose;

    match command {
        Command::Show(args) => {
            let results_file = match (&args.results_file, args.item) {
                (Some(path), _) => path.clone(),
                (None, Some(item)) => history::resolve_entry(&config.history.log, item)?,
                (None, None) => {
                    return Err(ReportError::Config(
                        "a results file or --item is required".to_string(),
                    ))
                }
            };
            reporter.echo_results_file(&results_file, no_color, verbose)?;
            if args.log {
                reporter.echo_log(&history::log_path_for(&results_file))?;
            }
            Ok(())
        }
        Command::Log { path } => reporter.echo_log(path),
        Command::History { action: None } => reporter.results_history(&config.history.log),
        Command::History {
            action: Some(HistoryAction::Add { results_file }),
        } => history::record(&config.history.log, results_file),
        Command::Init { force } => {
            let path = crate::config::write_default_config(*force)?;
            reporter.echo(&format!("Config written to {}", path.display()))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
