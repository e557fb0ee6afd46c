//! fflt - lint, fix, format and typecheck only the files changed against a branch.

use std::io::{self, Write};
use std::panic;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use crossterm::{cursor::Show, execute, terminal::disable_raw_mode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fflt::cli::{self, CliError, Options, Workspace};
use fflt::core::ensure_git_installed;
use fflt::prompt::PromptError;

/// Run linters, formatters and type checkers on the files changed against a git branch.
#[derive(Parser, Debug)]
#[command(name = "fflt", version, about, disable_version_flag = true)]
struct Cli {
    /// Show version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Include staged files
    #[arg(short = 'c', long = "cached", global = true, overrides_with = "no_cached")]
    cached: bool,

    /// Exclude staged files
    #[arg(long = "no-cached", global = true)]
    no_cached: bool,

    /// Use the configured default branch
    #[arg(short = 'd', long = "default", global = true, conflicts_with = "branch")]
    use_default: bool,

    /// Name of the branch to compare against
    #[arg(short = 'b', long = "branch", global = true, value_name = "NAME")]
    branch: Option<String>,

    /// Include files outside the working directory
    #[arg(short = 'r', long = "root", global = true)]
    root: bool,

    /// Ignore pattern (regex)
    #[arg(short = 'i', long = "ignore", global = true, value_name = "REGEX")]
    ignore: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file interactively
    Init,
    /// Run commands against the changed files
    Command {
        /// Commands to run (lint, fix, format, typecheck or a script name)
        #[arg(value_name = "TASK")]
        tasks: Vec<String>,
    },
}

impl Cli {
    fn options(&self) -> Options {
        let cached = match (self.cached, self.no_cached) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Options {
            cached,
            use_default: self.use_default,
            branch: self.branch.clone(),
            root: self.root,
            ignore: self.ignore.clone(),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FFLT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_logging();
    fflt::metrics::init();

    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    // Make sure a panic mid-prompt does not leave the terminal raw.
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = execute!(io::stdout(), Show);
        let _ = disable_raw_mode();
        let _ = io::stdout().flush();
        default_hook(info);
    }));

    match run(&cli, command) {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(CliError::Prompt(PromptError::Interrupted)) => ExitCode::from(130),
            _ => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(1)
            }
        },
    }
}

fn run(cli: &Cli, command: &Command) -> Result<ExitCode> {
    let options = cli.options();
    if let Some(pattern) = &options.ignore {
        cli::validate_ignore_pattern(pattern)?;
    }

    ensure_git_installed()?;

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let workspace = Workspace::load(&cwd)?;

    let code = match command {
        Command::Init => cli::run_init(&workspace)?,
        Command::Command { tasks } => cli::run_command(&workspace, tasks, &options)?,
    };
    Ok(code)
}
