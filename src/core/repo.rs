//! Git repository discovery, branch listing and changed-file computation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::metrics;

/// Branches that sort ahead of everything else in branch listings.
pub const MAIN_BRANCHES: &[&str] = &["master", "main", "root", "primary"];

/// Change kinds passed to `git diff --diff-filter` (everything but deletions).
const DIFF_FILTER: &str = "--diff-filter=ACMRTUB";

/// Errors from repository operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoError {
    /// The git executable could not be spawned.
    #[error("git is not installed")]
    GitNotInstalled,
    /// Path is not inside a git repository.
    #[error("not inside a git repository")]
    NotARepo,
    /// Git command failed with an error message.
    #[error("git command failed: {0}")]
    GitError(String),
    /// I/O error during git operation.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Git output contained invalid UTF-8.
    #[error("invalid utf-8 in git output")]
    InvalidUtf8,
    /// The ignore pattern is not a valid regex.
    #[error("invalid ignore pattern: {0}")]
    InvalidIgnorePattern(#[from] regex::Error),
}

/// Check that `git` can be spawned.
pub fn ensure_git_installed() -> Result<(), RepoError> {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|_| ())
        .map_err(|_| RepoError::GitNotInstalled)
}

/// Canonicalized path to a git repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Discover the git repository containing the given path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use fflt::core::RepoRoot;
    /// use std::path::Path;
    ///
    /// let repo = RepoRoot::discover(Path::new(".")).expect("not in a git repo");
    /// println!("Repo at: {}", repo.path().display());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let output = Command::new("git")
            .arg("rev-parse")
            .arg("--show-toplevel")
            .current_dir(path)
            .output()?;

        if !output.status.success() {
            return Err(RepoError::NotARepo);
        }

        let root = std::str::from_utf8(&output.stdout)
            .map_err(|_| RepoError::InvalidUtf8)?
            .trim();

        let canonical = PathBuf::from(root)
            .canonicalize()
            .map_err(|_| RepoError::NotARepo)?;

        Ok(Self(canonical))
    }

    /// Get the repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Run git in `dir` and return stdout.
fn git(dir: &Path, args: &[&str]) -> Result<String, RepoError> {
    tracing::debug!(?args, "git");
    let output = Command::new("git").args(args).current_dir(dir).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RepoError::GitError(stderr.trim().to_string()));
    }

    String::from_utf8(output.stdout).map_err(|_| RepoError::InvalidUtf8)
}

/// List local and remote branch names, main branches first.
pub fn list_branches(root: &RepoRoot) -> Result<Vec<String>, RepoError> {
    let _timer = metrics::Timer::start("list_branches");
    let output = git(root.path(), &["branch", "-a"])?;
    Ok(parse_branch_list(&output))
}

/// Parse `git branch -a` output.
///
/// Remote branches lose their `remotes/<remote>/` prefix and collapse into
/// their local counterparts; symbolic refs (`HEAD -> origin/main`) are skipped.
fn parse_branch_list(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for line in output.lines() {
        // Two marker columns: `* `, `+ ` or two spaces.
        let name = line.get(2..).unwrap_or("").trim();
        if name.is_empty() || name.contains(" -> ") || name.starts_with('(') {
            continue;
        }
        let name = match name.strip_prefix("remotes/") {
            Some(rest) => rest.split_once('/').map_or(rest, |(_, branch)| branch),
            None => name,
        };
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }

    let (mut main, mut rest): (Vec<String>, Vec<String>) = names
        .into_iter()
        .partition(|name| MAIN_BRANCHES.contains(&name.as_str()));
    rest.sort();
    main.append(&mut rest);
    main
}

/// Options for [`diff_files`].
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Branch (or any revision) to diff against.
    pub branch: String,
    /// Case-insensitive regex of paths to drop. Empty means keep everything.
    pub ignore_pattern: String,
    /// Also include staged changes.
    pub include_cached: bool,
    /// Include files outside the working directory, as `../` paths.
    pub from_root: bool,
}

/// List files changed against `options.branch`, relative to `cwd`.
///
/// Deleted files are excluded. The result is deduplicated and keeps git's
/// order, unstaged changes first.
pub fn diff_files(root: &RepoRoot, cwd: &Path, options: &DiffOptions) -> Result<Vec<String>, RepoError> {
    let _timer = metrics::Timer::start("diff_files");

    let ignore = ignore_regex(&options.ignore_pattern)?;

    let mut files: Vec<String> = git(
        root.path(),
        &["diff", "--name-only", &options.branch, DIFF_FILTER],
    )?
    .lines()
    .map(str::to_string)
    .collect();

    if options.include_cached {
        let cached = git(
            root.path(),
            &["diff", "--name-only", "--cached", &options.branch, DIFF_FILTER],
        )?;
        files.extend(cached.lines().map(str::to_string));
    }

    let cwd = cwd.canonicalize()?;
    let prefix = cwd
        .strip_prefix(root.path())
        .map_err(|_| RepoError::NotARepo)?;

    let result = relativize(files, prefix, ignore.as_ref(), options.from_root);
    metrics::count("diff_files", result.len());
    tracing::debug!(count = result.len(), branch = %options.branch, "changed files");
    Ok(result)
}

/// Compile an ignore pattern. An empty pattern ignores nothing.
pub fn ignore_regex(pattern: &str) -> Result<Option<Regex>, RepoError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Ok(Some(RegexBuilder::new(pattern).case_insensitive(true).build()?))
}

/// Filter repo-relative paths and rewrite them relative to `prefix`
/// (the working directory relative to the repo root).
fn relativize(
    files: Vec<String>,
    prefix: &Path,
    ignore: Option<&Regex>,
    from_root: bool,
) -> Vec<String> {
    let prefix: Vec<&str> = prefix
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    let dir_prefix = if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix.join("/"))
    };
    let up_dir = "../".repeat(prefix.len());

    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|file| !file.is_empty())
        .filter(|file| ignore.map_or(true, |re| !re.is_match(file)))
        .filter_map(|file| match file.strip_prefix(&dir_prefix) {
            Some(inside) => Some(inside.to_string()),
            None if from_root => Some(format!("{}{}", up_dir, file)),
            None => None,
        })
        .filter(|file| seen.insert(file.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_branches_main_first_rest_sorted() {
        let output = "  feature/zeta\n* main\n  alpha\n  remotes/origin/HEAD -> origin/main\n  remotes/origin/main\n  remotes/origin/feature/zeta\n  remotes/upstream/beta\n";
        assert_eq!(
            parse_branch_list(output),
            strings(&["main", "alpha", "beta", "feature/zeta"])
        );
    }

    #[test]
    fn parse_branches_keeps_main_branch_order() {
        let output = "  primary\n  master\n  dev\n";
        assert_eq!(parse_branch_list(output), strings(&["primary", "master", "dev"]));
    }

    #[test]
    fn parse_branches_skips_detached_head() {
        let output = "* (HEAD detached at 1a2b3c)\n  main\n+ worktree-branch\n";
        assert_eq!(parse_branch_list(output), strings(&["main", "worktree-branch"]));
    }

    #[test]
    fn parse_branches_empty() {
        assert!(parse_branch_list("").is_empty());
    }

    #[test]
    fn relativize_at_root_keeps_everything() {
        let files = strings(&["src/a.ts", "README.md", "src/a.ts"]);
        assert_eq!(
            relativize(files, Path::new(""), None, false),
            strings(&["src/a.ts", "README.md"])
        );
    }

    #[test]
    fn relativize_in_subdir() {
        let files = strings(&["web/src/a.ts", "api/main.ts", "web/b.ts"]);
        assert_eq!(
            relativize(files.clone(), Path::new("web"), None, false),
            strings(&["src/a.ts", "b.ts"])
        );
        assert_eq!(
            relativize(files, Path::new("web"), None, true),
            strings(&["src/a.ts", "../api/main.ts", "b.ts"])
        );
    }

    #[test]
    fn relativize_nested_up_dirs() {
        let files = strings(&["api/main.ts"]);
        assert_eq!(
            relativize(files, Path::new("packages/web"), None, true),
            strings(&["../../api/main.ts"])
        );
    }

    #[test]
    fn relativize_applies_ignore_case_insensitively() {
        let re = ignore_regex(r"yarn\.lock|package-lock\.json").unwrap();
        let files = strings(&["YARN.LOCK", "package-lock.json", "src/index.ts"]);
        assert_eq!(
            relativize(files, Path::new(""), re.as_ref(), false),
            strings(&["src/index.ts"])
        );
    }

    #[test]
    fn empty_ignore_pattern_ignores_nothing() {
        assert!(ignore_regex("").unwrap().is_none());
    }

    #[test]
    fn invalid_ignore_pattern_errors() {
        assert!(matches!(
            ignore_regex("("),
            Err(RepoError::InvalidIgnorePattern(_))
        ));
    }
}
