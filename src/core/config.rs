//! Config file discovery, merging and writing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::PackageJson;

/// Tools fflt knows how to drive, in display order.
pub const DEFAULT_COMMANDS: &[&str] = &["eslint", "prettier", "tsc"];

/// Script name prefixes picked up from package.json by default.
pub const DEFAULT_SCRIPTS: &[&str] = &["lint", "fix", "format", "tsc", "typecheck"];

/// File names checked in each directory, in priority order.
const SEARCH_PLACES: &[&str] = &[
    "package.json",
    ".ffltrc",
    ".ffltrc.json",
    ".ffltrc.yaml",
    ".ffltrc.yml",
    ".ffltrc.js",
    ".ffltrc.cjs",
    ".ffltrc.mjs",
    "fflt.config.js",
    "fflt.config.cjs",
    "fflt.config.mjs",
];

/// Errors from reading or writing config files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// I/O error while reading or writing a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON config file failed to parse.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Parse error.
        source: serde_json::Error,
    },
    /// A YAML config file failed to parse.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// Offending file.
        path: PathBuf,
        /// Parse error.
        source: serde_yaml::Error,
    },
    /// A script config file that does not export a plain object literal.
    #[error("{0} must export a plain JSON object (module.exports = {{...}} or export default {{...}})")]
    UnsupportedScript(PathBuf),
    /// Serializing the config failed.
    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Package manager used to run package.json scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm (`npm run <script> -- <files>`).
    #[default]
    Npm,
    /// Yarn (`yarn run <script> <files>`).
    Yarn,
    /// pnpm (`pnpm run <script> <files>`).
    Pnpm,
}

impl PackageManager {
    /// Every supported package manager.
    pub const ALL: [PackageManager; 3] = [Self::Npm, Self::Yarn, Self::Pnpm];

    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    /// Arguments that run `script` with `files` appended.
    pub fn run_args(self, script: &str, files: &[String]) -> Vec<String> {
        let mut args = vec!["run".to_string(), script.to_string()];
        if self == Self::Npm && !files.is_empty() {
            args.push("--".to_string());
        }
        args.extend(files.iter().cloned());
        args
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

impl std::str::FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pm| pm.program() == s)
            .ok_or_else(|| format!("unknown package manager: {}", s))
    }
}

/// Effective fflt configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Tools to offer (`eslint`, `prettier`, `tsc`).
    pub commands: Vec<String>,
    /// package.json scripts to offer (prefix match on load).
    pub scripts: Vec<String>,
    /// Branch used by `--default`.
    pub default_branch: String,
    /// Regex of paths to drop from the diff.
    pub ignore_pattern: String,
    /// Whether staged changes count as changed files.
    pub include_cached: bool,
    /// Package manager for scripts.
    pub package_manager: PackageManager,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commands: DEFAULT_COMMANDS.iter().map(|s| s.to_string()).collect(),
            scripts: DEFAULT_SCRIPTS.iter().map(|s| s.to_string()).collect(),
            default_branch: "main".to_string(),
            ignore_pattern: r"yarn\.lock|package-lock\.json".to_string(),
            include_cached: true,
            package_manager: PackageManager::Npm,
        }
    }
}

/// A partially specified config as found on disk.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    commands: Option<Vec<String>>,
    scripts: Option<Vec<String>>,
    default_branch: Option<String>,
    ignore_pattern: Option<String>,
    include_cached: Option<bool>,
    package_manager: Option<PackageManager>,
}

impl RawConfig {
    fn has_core_key(&self) -> bool {
        self.commands.is_some() || self.scripts.is_some() || self.default_branch.is_some()
    }
}

impl Config {
    /// Merge a discovered config object over the defaults.
    ///
    /// The object is only honoured when it sets at least one of `commands`,
    /// `scripts` or `default_branch` and every field has the expected type.
    pub fn from_value(value: serde_json::Value) -> Self {
        let raw = match serde_json::from_value::<RawConfig>(value) {
            Ok(raw) if raw.has_core_key() => raw,
            Ok(_) => {
                tracing::debug!("config sets none of commands/scripts/default_branch; using defaults");
                return Self::default();
            }
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed config");
                return Self::default();
            }
        };

        let defaults = Self::default();
        Self {
            commands: raw.commands.unwrap_or(defaults.commands),
            scripts: raw.scripts.unwrap_or(defaults.scripts),
            default_branch: raw.default_branch.unwrap_or(defaults.default_branch),
            ignore_pattern: raw.ignore_pattern.unwrap_or(defaults.ignore_pattern),
            include_cached: raw.include_cached.unwrap_or(defaults.include_cached),
            package_manager: raw.package_manager.unwrap_or(defaults.package_manager),
        }
    }

    /// Narrow the config to what the package can actually run.
    ///
    /// Tools are kept only when their npm package is a dependency; scripts
    /// become the package's script names that start with a configured prefix.
    #[must_use]
    pub fn formatted(mut self, package: &PackageJson) -> Self {
        self.commands
            .retain(|command| dependency_for(command).is_some_and(|dep| package.has_dependency(dep)));

        let prefixes = std::mem::take(&mut self.scripts);
        self.scripts = package
            .scripts
            .keys()
            .filter(|script| prefixes.iter().any(|prefix| script.starts_with(prefix.as_str())))
            .cloned()
            .collect();

        self
    }
}

/// npm package providing a tool.
pub fn dependency_for(command: &str) -> Option<&'static str> {
    match command {
        "eslint" => Some("eslint"),
        "prettier" => Some("prettier"),
        "tsc" => Some("typescript"),
        _ => None,
    }
}

/// A config object found on disk.
#[derive(Debug, Clone)]
pub struct FoundConfig {
    /// File the config came from.
    pub path: PathBuf,
    /// Raw config object.
    pub value: serde_json::Value,
}

/// Search for a config file from `start` upwards.
///
/// Stops after the user's home directory when `start` is inside it.
pub fn search(start: &Path) -> Result<Option<FoundConfig>, ConfigError> {
    let home = dirs::home_dir();

    for dir in start.ancestors() {
        for place in SEARCH_PLACES {
            let path = dir.join(place);
            if !path.is_file() {
                continue;
            }
            if let Some(value) = load_file(&path)? {
                tracing::debug!(path = %path.display(), "found config");
                return Ok(Some(FoundConfig { path, value }));
            }
        }

        if home.as_deref() == Some(dir) {
            break;
        }
    }

    Ok(None)
}

/// Load a config object from a single file.
///
/// Returns `Ok(None)` for empty files and for package.json without an
/// `fflt` key.
pub fn load_file(path: &Path) -> Result<Option<serde_json::Value>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    if file_name == "package.json" {
        let mut package = parse_json(path, &content)?;
        return Ok(package.get_mut("fflt").map(serde_json::Value::take));
    }

    let value = match extension {
        "json" => parse_json(path, &content)?,
        "js" | "cjs" | "mjs" => parse_script(path, &content)?,
        // `.ffltrc`, `.yaml` and `.yml`; YAML also accepts JSON.
        _ => serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
    };

    Ok(Some(value))
}

fn parse_json(path: &Path, content: &str) -> Result<serde_json::Value, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_script(path: &Path, content: &str) -> Result<serde_json::Value, ConfigError> {
    let body = content.trim();
    let body = body
        .strip_prefix("module.exports")
        .and_then(|rest| rest.trim_start().strip_prefix('='))
        .or_else(|| body.strip_prefix("export default"))
        .ok_or_else(|| ConfigError::UnsupportedScript(path.to_path_buf()))?;
    let body = body.trim().trim_end_matches(';');

    serde_json::from_str(body).map_err(|_| ConfigError::UnsupportedScript(path.to_path_buf()))
}

/// On-disk config formats `fflt init` can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.ffltrc` (JSON).
    Json,
    /// `.ffltrc.yml`.
    Yaml,
    /// `.ffltrc.js` (CommonJS export).
    Js,
    /// `.ffltrc.mjs` (ES module export).
    Mjs,
    /// `.ffltrc.cjs` (CommonJS export).
    Cjs,
}

impl ConfigFormat {
    /// Every format, in the order offered to the user.
    pub const ALL: [ConfigFormat; 5] = [Self::Json, Self::Yaml, Self::Js, Self::Mjs, Self::Cjs];

    /// File name written for this format.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Json => ".ffltrc",
            Self::Yaml => ".ffltrc.yml",
            Self::Js => ".ffltrc.js",
            Self::Mjs => ".ffltrc.mjs",
            Self::Cjs => ".ffltrc.cjs",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Js => "JavaScript",
            Self::Mjs => "JavaScript (Module)",
            Self::Cjs => "JavaScript (Common)",
        }
    }

    /// One-line description for prompts.
    pub fn description(self) -> &'static str {
        match self {
            Self::Json => "Create a JSON config file",
            Self::Yaml => "Create a YAML config file",
            Self::Js => "Create a JavaScript config file (.js)",
            Self::Mjs => "Create a JavaScript config file (.mjs)",
            Self::Cjs => "Create a JavaScript config file (.cjs)",
        }
    }

    /// Render `config` in this format.
    pub fn render(self, config: &Config) -> Result<String, ConfigError> {
        let json = || {
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))
        };
        Ok(match self {
            Self::Json => json()?,
            Self::Yaml => {
                serde_yaml::to_string(config).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Self::Js | Self::Cjs => format!("module.exports = {}", json()?),
            Self::Mjs => format!("export default {}", json()?),
        })
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Write `config` into `dir` in the given format. Returns the written path.
pub fn write_config(dir: &Path, format: ConfigFormat, config: &Config) -> Result<PathBuf, ConfigError> {
    let path = dir.join(format.file_name());
    std::fs::write(&path, format.render(config)?)?;
    tracing::debug!(path = %path.display(), "wrote config");
    Ok(path)
}
