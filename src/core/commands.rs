//! Lint/format/typecheck tasks and how to spawn them.

use std::fmt;
use std::path::Path;
use std::process::Command;

use crossterm::style::Stylize;
use thiserror::Error;

use crate::core::{Config, PackageManager};
use crate::metrics;

/// Errors from running a task.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TaskError {
    /// The program could not be started (usually not installed).
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// A built-in task backed by a tool from `config.commands`.
struct ToolTask {
    tool: &'static str,
    name: &'static str,
    args: &'static [&'static str],
    with_files: bool,
    description: &'static str,
}

const TOOL_TASKS: &[ToolTask] = &[
    ToolTask {
        tool: "eslint",
        name: "lint",
        args: &["--no-error-on-unmatched-pattern"],
        with_files: true,
        description: "Lint files using selected Git branch",
    },
    ToolTask {
        tool: "eslint",
        name: "fix",
        args: &["--no-error-on-unmatched-pattern", "--fix"],
        with_files: true,
        description: "Fix files using selected Git branch",
    },
    ToolTask {
        tool: "prettier",
        name: "format",
        args: &["--ignore-unknown", "--write"],
        with_files: true,
        description: "Format files using selected Git branch",
    },
    ToolTask {
        tool: "tsc",
        name: "typecheck",
        args: &["--noEmit"],
        with_files: false,
        description: "Typecheck using selected Git branch",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskKind {
    Tool {
        program: &'static str,
        args: &'static [&'static str],
        with_files: bool,
    },
    Script {
        manager: PackageManager,
        script: String,
    },
}

/// Something fflt can run against a list of changed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    description: String,
    kind: TaskKind,
}

impl Task {
    /// Task name as typed on the command line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this task runs a package.json script.
    pub fn is_script(&self) -> bool {
        matches!(self.kind, TaskKind::Script { .. })
    }

    /// The command line this task runs for `files`.
    pub fn command_line(&self, files: &[String]) -> CommandLine {
        match &self.kind {
            TaskKind::Tool {
                program,
                args,
                with_files,
            } => {
                let mut argv: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                if *with_files {
                    argv.extend(files.iter().cloned());
                }
                CommandLine::new(*program, argv)
            }
            TaskKind::Script { manager, script } => {
                CommandLine::new(manager.program(), manager.run_args(script, files))
            }
        }
    }

    /// Run the task in `dir`, capturing its output.
    pub fn run(&self, dir: &Path, files: &[String]) -> Result<TaskOutput, TaskError> {
        let _timer = metrics::Timer::start("task_run");
        self.command_line(files).run(dir)
    }
}

/// Every task the config enables: tool tasks first, then scripts.
pub fn available_tasks(config: &Config) -> Vec<Task> {
    let tools = TOOL_TASKS
        .iter()
        .filter(|task| config.commands.iter().any(|c| c == task.tool))
        .map(|task| Task {
            name: task.name.to_string(),
            description: task.description.to_string(),
            kind: TaskKind::Tool {
                program: task.tool,
                args: task.args,
                with_files: task.with_files,
            },
        });

    let scripts = config.scripts.iter().map(|script| Task {
        name: script.clone(),
        description: format!(
            "Run the {} script with {}",
            script, config.package_manager
        ),
        kind: TaskKind::Script {
            manager: config.package_manager,
            script: script.clone(),
        },
    });

    tools.chain(scripts).collect()
}

/// Look up tasks by name. Tool tasks win over scripts of the same name.
///
/// Returns the unknown names as the error.
pub fn resolve_tasks(tasks: &[Task], names: &[String]) -> Result<Vec<Task>, Vec<String>> {
    let mut found = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        match tasks.iter().find(|task| &task.name == name) {
            Some(task) => found.push(task.clone()),
            None => unknown.push(name.clone()),
        }
    }
    if unknown.is_empty() {
        Ok(found)
    } else {
        Err(unknown)
    }
}

/// A program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Executable.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Create a command line.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Colored rendering: program magenta, flags gray, arguments cyan.
    pub fn styled(&self) -> String {
        let mut out = self.program.as_str().magenta().to_string();
        for arg in &self.args {
            out.push(' ');
            if arg.starts_with('-') {
                out.push_str(&arg.as_str().grey().to_string());
            } else {
                out.push_str(&arg.as_str().cyan().to_string());
            }
        }
        out
    }

    fn run(&self, dir: &Path) -> Result<TaskOutput, TaskError> {
        tracing::debug!(program = %self.program, args = ?self.args, "spawning");
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(dir)
            .output()
            .map_err(|source| TaskError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        Ok(TaskOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished task.
#[derive(Debug, Clone)]
pub struct TaskOutput {
    /// Exit status was zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(commands: &[&str], scripts: &[&str]) -> Config {
        Config {
            commands: commands.iter().map(|s| s.to_string()).collect(),
            scripts: scripts.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        }
    }

    fn files() -> Vec<String> {
        vec!["src/a.ts".to_string(), "src/b.ts".to_string()]
    }

    #[test]
    fn tasks_follow_enabled_tools() {
        let tasks = available_tasks(&config(&["eslint", "tsc"], &["lint:ci"]));
        let names: Vec<&str> = tasks.iter().map(Task::name).collect();
        assert_eq!(names, vec!["lint", "fix", "typecheck", "lint:ci"]);
        assert!(tasks[3].is_script());
    }

    #[test]
    fn eslint_gets_files() {
        let tasks = available_tasks(&config(&["eslint"], &[]));
        assert_eq!(
            tasks[1].command_line(&files()).to_string(),
            "eslint --no-error-on-unmatched-pattern --fix src/a.ts src/b.ts"
        );
    }

    #[test]
    fn typecheck_ignores_files() {
        let tasks = available_tasks(&config(&["tsc"], &[]));
        assert_eq!(tasks[0].command_line(&files()).to_string(), "tsc --noEmit");
    }

    #[test]
    fn scripts_run_through_package_manager() {
        let tasks = available_tasks(&config(&[], &["lint"]));
        assert_eq!(
            tasks[0].command_line(&files()).to_string(),
            "npm run lint -- src/a.ts src/b.ts"
        );
    }

    #[test]
    fn resolve_prefers_tool_tasks() {
        let tasks = available_tasks(&config(&["eslint"], &["lint"]));
        let resolved = resolve_tasks(&tasks, &["lint".to_string()]).unwrap();
        assert!(!resolved[0].is_script());
    }

    #[test]
    fn resolve_reports_unknown() {
        let tasks = available_tasks(&config(&["prettier"], &[]));
        let err = resolve_tasks(&tasks, &["format".to_string(), "deploy".to_string()]).unwrap_err();
        assert_eq!(err, vec!["deploy".to_string()]);
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let line = CommandLine::new("fflt-definitely-missing-program", Vec::new());
        let err = line.run(Path::new(".")).unwrap_err();
        assert!(matches!(err, TaskError::Spawn { .. }));
    }
}
