//! package.json discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors from locating or reading package.json.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackageError {
    /// No package.json between the start directory and the filesystem root.
    #[error("could not find root; root must have a package.json")]
    MissingRoot,
    /// I/O error while reading package.json.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// package.json is not valid JSON.
    #[error("invalid package.json at {path}: {source}")]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// The parts of package.json fflt cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    /// Runtime dependencies.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Development dependencies.
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Script name to shell command.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl PackageJson {
    /// Whether `name` appears in dependencies or devDependencies.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    /// Parse package.json content.
    pub fn parse(path: &Path, content: &str) -> Result<Self, PackageError> {
        serde_json::from_str(content).map_err(|source| PackageError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A located package.json together with its parsed content.
#[derive(Debug, Clone)]
pub struct PackageRoot {
    manifest: PathBuf,
    package: PackageJson,
}

impl PackageRoot {
    /// Walk up from `start` to the nearest package.json.
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(start: &Path) -> Result<Self, PackageError> {
        let manifest = start
            .ancestors()
            .map(|dir| dir.join("package.json"))
            .find(|candidate| candidate.is_file())
            .ok_or(PackageError::MissingRoot)?;

        let content = std::fs::read_to_string(&manifest)?;
        let package = PackageJson::parse(&manifest, &content)?;
        tracing::debug!(manifest = %manifest.display(), "found package.json");

        Ok(Self { manifest, package })
    }

    /// Directory holding package.json.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.manifest.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Parsed package.json.
    #[must_use]
    pub fn package(&self) -> &PackageJson {
        &self.package
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discover_walks_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"devDependencies":{"eslint":"^8"},"scripts":{"lint":"eslint ."}}"#,
        )
        .unwrap();
        let nested = dir.path().join("src/components");
        std::fs::create_dir_all(&nested).unwrap();

        let root = PackageRoot::discover(&nested).unwrap();
        assert_eq!(root.dir(), dir.path());
        assert!(root.package().has_dependency("eslint"));
        assert!(!root.package().has_dependency("prettier"));
        assert_eq!(root.package().scripts["lint"], "eslint .");
    }

    #[test]
    fn parse_tolerates_missing_sections() {
        let pkg = PackageJson::parse(Path::new("package.json"), r#"{"name":"x"}"#).unwrap();
        assert!(pkg.scripts.is_empty());
        assert!(pkg.dependencies.is_empty());
    }

    #[test]
    fn parse_reports_invalid_json() {
        let err = PackageJson::parse(Path::new("package.json"), "{").unwrap_err();
        assert!(matches!(err, PackageError::Parse { .. }));
    }
}
