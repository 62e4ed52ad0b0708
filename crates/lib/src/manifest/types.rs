//! `package.json` data consumed by addon discovery and resolution.
//!
//! Only a subset of the manifest matters here:
//! - `name`, `version`, `keywords`
//! - `dependencies` / `devDependencies`, walked during discovery
//! - `quilt-addon`: the addon section (`main`, `before`, `after`, `paths`)
//! - `quilt-addon-main`: the deprecated top-level entry point field
//! - `quilt`: project options, read only from the project's own manifest
//!
//! Unknown fields are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{ADDON_KEYWORD, PACKAGE_MANIFEST};

/// Errors reading a package manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// The `quilt-addon` section of a package manifest.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonSection {
  /// Entry point, relative to the package directory.
  pub main: Option<String>,
  /// Addons this one must be composed before.
  pub before: Vec<String>,
  /// Addons this one must be composed after.
  pub after: Vec<String>,
  /// In-repo addon directories, relative to the package directory.
  pub paths: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManifest {
  pub name: String,
  pub version: Option<String>,
  pub keywords: Vec<String>,
  pub dependencies: BTreeMap<String, String>,
  #[serde(rename = "devDependencies")]
  pub dev_dependencies: BTreeMap<String, String>,
  #[serde(rename = "quilt-addon", skip_serializing_if = "Option::is_none")]
  pub addon: Option<AddonSection>,
  #[serde(rename = "quilt-addon-main", skip_serializing_if = "Option::is_none")]
  pub legacy_main: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub quilt: Option<serde_json::Value>,
}

impl PackageManifest {
  pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
    serde_json::from_str(content).map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Read and parse the manifest at `path`.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content, path)
  }

  /// Whether the package declares itself an addon.
  pub fn is_addon(&self) -> bool {
    self.keywords.iter().any(|k| k == ADDON_KEYWORD)
  }

  /// Dependency names, runtime and development, sorted and deduplicated.
  pub fn dependency_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self
      .dependencies
      .keys()
      .chain(self.dev_dependencies.keys())
      .map(String::as_str)
      .collect();
    names.sort_unstable();
    names.dedup();
    names
  }

  pub fn before(&self) -> &[String] {
    self.addon.as_ref().map(|a| a.before.as_slice()).unwrap_or_default()
  }

  pub fn after(&self) -> &[String] {
    self.addon.as_ref().map(|a| a.after.as_slice()).unwrap_or_default()
  }

  pub fn addon_paths(&self) -> &[String] {
    self.addon.as_ref().map(|a| a.paths.as_slice()).unwrap_or_default()
  }
}

/// A package on disk: its directory and parsed manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct AddonPackage {
  pub path: PathBuf,
  pub manifest: PackageManifest,
}

impl AddonPackage {
  /// Load the package rooted at `dir`.
  pub fn load(dir: &Path) -> Result<Self, ManifestError> {
    let manifest = PackageManifest::load(&dir.join(PACKAGE_MANIFEST))?;
    Ok(Self {
      path: dir.to_path_buf(),
      manifest,
    })
  }

  pub fn name(&self) -> &str {
    &self.manifest.name
  }
}
