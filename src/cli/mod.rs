//! `fflt init` and `fflt command`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crossterm::style::Stylize;
use thiserror::Error;

use crate::core::{
    available_tasks, diff_files, list_branches, resolve_tasks, search, write_config, Config,
    ConfigError, ConfigFormat, DiffOptions, PackageError, PackageManager, PackageRoot, RepoError,
    RepoRoot, Task, TaskError,
};
use crate::prompt::{self, CheckboxConfig, CheckboxPrompt, Choice, Entry, PromptError, SelectConfig, SelectPrompt};

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// No package.json between the working directory and the filesystem root.
    #[error("Could not find root. Root must have a package.json.")]
    MissingRoot,
    /// `--ignore` starts or ends with a slash.
    #[error("The ignore pattern {0} must not start or end with a slash.")]
    InvalidIgnorePattern(String),
    /// Task names that are neither tools nor configured scripts.
    #[error("Unknown command(s): {}", .0.join(", "))]
    UnknownTasks(Vec<String>),
    /// Nothing is enabled in the config.
    #[error("No commands available. Install eslint, prettier or typescript, or configure scripts.")]
    NoTasks,
    /// The repository has no branches to compare against.
    #[error("No branches found")]
    NoBranches,
    /// Git failed.
    #[error(transparent)]
    Repo(#[from] RepoError),
    /// Reading or writing a config file failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// package.json could not be read.
    #[error(transparent)]
    Package(PackageError),
    /// A prompt failed or was interrupted.
    #[error(transparent)]
    Prompt(#[from] PromptError),
    /// Writing to stdout failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<PackageError> for CliError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::MissingRoot => Self::MissingRoot,
            other => Self::Package(other),
        }
    }
}

/// Check `--ignore` for a leading or trailing `/`. The value is used as a
/// bare regex, so `/pattern/` literals and `dist/`-style globs are refused.
pub fn is_valid_ignore_pattern(pattern: &str) -> bool {
    !(pattern.starts_with('/') || pattern.ends_with('/'))
}

/// Return an error unless [`is_valid_ignore_pattern`] accepts `pattern`.
pub fn validate_ignore_pattern(pattern: &str) -> Result<(), CliError> {
    if is_valid_ignore_pattern(pattern) {
        Ok(())
    } else {
        Err(CliError::InvalidIgnorePattern(pattern.to_string()))
    }
}

/// Flags shared by the subcommands.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// `--cached` / `--no-cached`; `None` defers to the config.
    pub cached: Option<bool>,
    /// `--default`: use the configured default branch.
    pub use_default: bool,
    /// `--branch <name>`.
    pub branch: Option<String>,
    /// `--root`: include files outside the working directory.
    pub root: bool,
    /// `--ignore <regex>`; `None` defers to the config.
    pub ignore: Option<String>,
}

/// Everything discovered about the project fflt runs in.
#[derive(Debug)]
pub struct Workspace {
    cwd: PathBuf,
    repo: RepoRoot,
    package: PackageRoot,
    config: Config,
    config_path: Option<PathBuf>,
}

impl Workspace {
    /// Discover package.json, the git repository and the config from `cwd`.
    pub fn load(cwd: &Path) -> Result<Self, CliError> {
        let package = PackageRoot::discover(cwd)?;
        let repo = RepoRoot::discover(cwd)?;
        let found = search(cwd)?;

        let config_path = found.as_ref().map(|f| f.path.clone());
        let config = found
            .map(|f| Config::from_value(f.value))
            .unwrap_or_default()
            .formatted(package.package());
        tracing::debug!(?config_path, ?config, "workspace loaded");

        Ok(Self {
            cwd: cwd.to_path_buf(),
            repo,
            package,
            config,
            config_path,
        })
    }

    /// Effective config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Config file in use, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Two-choice select standing in for a yes/no question.
fn confirm(message: &str) -> Result<bool, CliError> {
    let prompt = SelectPrompt::new(SelectConfig::new(
        message,
        vec![
            Choice::new(true).name("Yes").into(),
            Choice::new(false).name("No").into(),
        ],
    ))?;
    Ok(prompt::run(prompt)?)
}

fn select<V: Clone + std::fmt::Display>(message: &str, choices: Vec<Entry<V>>) -> Result<V, CliError> {
    Ok(prompt::run(SelectPrompt::new(SelectConfig::new(message, choices))?)?)
}

fn format_choices() -> Vec<Entry<ConfigFormat>> {
    ConfigFormat::ALL
        .into_iter()
        .map(|format| {
            Choice::new(format)
                .name(format.label())
                .description(format.description())
                .into()
        })
        .collect()
}

fn package_manager_choices() -> Vec<Entry<PackageManager>> {
    PackageManager::ALL
        .into_iter()
        .map(|pm| Choice::new(pm).description(format!("Use {}", pm)).into())
        .collect()
}

fn branch_choices(branches: Vec<String>, describe: impl Fn(&str) -> String) -> Vec<Entry<String>> {
    branches
        .into_iter()
        .map(|branch| {
            let description = describe(&branch);
            Choice::new(branch).description(description).into()
        })
        .collect()
}

/// package.json scripts, pre-checked when the config already runs them.
fn script_choices(ws: &Workspace) -> Vec<Entry<String>> {
    ws.package
        .package()
        .scripts
        .iter()
        .map(|(name, script)| {
            Choice::new(name.clone())
                .description(script.clone())
                .checked(ws.config.scripts.contains(name))
                .into()
        })
        .collect()
}

fn task_choices(tasks: &[Task]) -> Vec<Entry<String>> {
    tasks
        .iter()
        .map(|task| {
            Choice::new(task.name().to_string())
                .description(task.description())
                .into()
        })
        .collect()
}

/// `fflt init`: build a config file through a series of prompts.
pub fn run_init(ws: &Workspace) -> Result<ExitCode, CliError> {
    if let Some(path) = ws.config_path() {
        println!("A config file already exists at {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if !confirm("Do you want to create a config file?")? {
        return Ok(ExitCode::SUCCESS);
    }

    let format = select("Which config file do you want to create?", format_choices())?;

    let mut config = ws.config.clone();
    config.package_manager = select(
        "Which package manager do you want to use?",
        package_manager_choices(),
    )?;

    let branches = list_branches(&ws.repo)?;
    if !branches.is_empty() {
        config.default_branch = select(
            "Which branch do you want to use as the default?",
            branch_choices(branches, |b| format!("Use {} as the default branch", b)),
        )?;
    }

    config.include_cached = confirm("Do you want to include staged files?")?;

    let scripts = script_choices(ws);
    if !scripts.is_empty() {
        config.scripts = prompt::run(CheckboxPrompt::new(CheckboxConfig::new(
            "Which scripts do you want to run?",
            scripts,
        )))?;
    }

    let path = write_config(ws.package.dir(), format, &config)?;
    println!("{} Created {}", "✔".green(), path.display());
    Ok(ExitCode::SUCCESS)
}

/// `fflt command [TASK...]`: run tasks against the files changed against a
/// branch.
pub fn run_command(ws: &Workspace, names: &[String], options: &Options) -> Result<ExitCode, CliError> {
    let available = available_tasks(&ws.config);

    let tasks = if names.is_empty() {
        if available.is_empty() {
            return Err(CliError::NoTasks);
        }
        let picked = prompt::run(CheckboxPrompt::new(CheckboxConfig::new(
            "Which commands do you want to run?",
            task_choices(&available),
        )))?;
        resolve_tasks(&available, &picked).map_err(CliError::UnknownTasks)?
    } else {
        resolve_tasks(&available, names).map_err(CliError::UnknownTasks)?
    };

    if tasks.is_empty() {
        println!("No commands selected");
        return Ok(ExitCode::SUCCESS);
    }

    let branch = pick_branch(ws, options)?;
    let diff_options = DiffOptions {
        branch,
        ignore_pattern: options
            .ignore
            .clone()
            .unwrap_or_else(|| ws.config.ignore_pattern.clone()),
        include_cached: options.cached.unwrap_or(ws.config.include_cached),
        from_root: options.root,
    };
    let files = diff_files(&ws.repo, &ws.cwd, &diff_options)?;

    if files.is_empty() {
        println!("No changed files");
        return Ok(ExitCode::SUCCESS);
    }

    let mut failed = 0;
    for task in &tasks {
        if !run_task(task, &ws.cwd, &files)? {
            failed += 1;
        }
    }

    tracing::debug!(tasks = tasks.len(), failed, files = files.len(), "command finished");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn pick_branch(ws: &Workspace, options: &Options) -> Result<String, CliError> {
    if let Some(branch) = &options.branch {
        return Ok(branch.clone());
    }
    if options.use_default {
        return Ok(ws.config.default_branch.clone());
    }

    let branches = list_branches(&ws.repo)?;
    if branches.is_empty() {
        return Err(CliError::NoBranches);
    }
    select(
        "Which branch do you want to compare against?",
        branch_choices(branches, |b| format!("Compare against {}", b)),
    )
}

/// Run one task, echoing its command line, status and output.
fn run_task(task: &Task, dir: &Path, files: &[String]) -> Result<bool, CliError> {
    let mut stdout = io::stdout();
    write!(stdout, "{} ", task.command_line(files).styled())?;
    stdout.flush()?;

    match task.run(dir, files) {
        Ok(output) => {
            if output.success {
                writeln!(stdout, "{}", "✔".green())?;
            } else {
                writeln!(stdout, "{} {}", "✖".red(), exit_note(output.code).dark_grey())?;
            }
            if !output.stdout.trim().is_empty() {
                writeln!(stdout, "{}", output.stdout.trim_end())?;
            }
            if !output.stderr.trim().is_empty() {
                eprintln!("{}", output.stderr.trim_end());
            }
            Ok(output.success)
        }
        Err(err @ TaskError::Spawn { .. }) => {
            writeln!(stdout, "{}", "✖".red())?;
            eprintln!("{}", err.to_string().red());
            Ok(false)
        }
    }
}

/// How a failed task ended, shown after the ✖ mark.
fn exit_note(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("(exit {})", code),
        None => "(killed by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_note_names_code_or_signal() {
        assert_eq!(exit_note(Some(2)), "(exit 2)");
        assert_eq!(exit_note(None), "(killed by signal)");
    }

    #[test]
    fn ignore_pattern_literal_forms_are_rejected() {
        assert!(!is_valid_ignore_pattern("/yarn.lock/"));
        assert!(!is_valid_ignore_pattern("/yarn.lock/gi"));
        assert!(!is_valid_ignore_pattern("/x/gi"));
        assert!(!is_valid_ignore_pattern("dist/"));
    }

    #[test]
    fn ignore_pattern_with_inner_slash_passes() {
        for pattern in ["src/ui", "app/is", "lib/sum", "packages/a/dist"] {
            assert!(is_valid_ignore_pattern(pattern), "{pattern}");
        }
    }

    #[test]
    fn ignore_pattern_plain_regexes_pass() {
        assert!(is_valid_ignore_pattern(r"yarn\.lock|package-lock\.json"));
        assert!(is_valid_ignore_pattern("src/generated"));
        assert!(is_valid_ignore_pattern(""));
        assert!(matches!(
            validate_ignore_pattern("/x/"),
            Err(CliError::InvalidIgnorePattern(p)) if p == "/x/"
        ));
    }

    #[test]
    fn missing_package_maps_to_missing_root() {
        assert!(matches!(
            CliError::from(PackageError::MissingRoot),
            CliError::MissingRoot
        ));
    }

    #[test]
    fn branch_choices_carry_descriptions() {
        let choices = branch_choices(vec!["main".into(), "dev".into()], |b| format!("Use {}", b));
        let first = choices[0].as_choice().unwrap();
        assert_eq!(first.value, "main");
        assert_eq!(first.description.as_deref(), Some("Use main"));
    }

    #[test]
    fn format_choices_use_labels() {
        let choices = format_choices();
        assert_eq!(choices.len(), 5);
        let labels: Vec<String> = choices
            .iter()
            .filter_map(Entry::as_choice)
            .map(|c| c.label().into_owned())
            .collect();
        assert_eq!(labels[0], "JSON");
        assert_eq!(labels[3], "JavaScript (Module)");
    }
}
