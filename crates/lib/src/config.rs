//! Project options.
//!
//! Read from the `quilt` object of the project's `package.json`:
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "quilt": {
//!     "lint": true,
//!     "lint_rules": ".lintrc",
//!     "extensions": { "js": ["ts"] },
//!     "whitelist": ["vendor-module"],
//!     "environment": "development"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::ADDON_ENV_DEVELOPMENT;

fn default_lint() -> bool {
  true
}

fn default_lint_rules() -> String {
  ".lintrc".to_string()
}

fn default_environment() -> String {
  ADDON_ENV_DEVELOPMENT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOptions {
  /// App name; defaults to the manifest's `name`.
  #[serde(default)]
  pub name: Option<String>,

  /// Whether development builds lint addon sources.
  #[serde(default = "default_lint")]
  pub lint: bool,

  /// Lint rules file, relative to the project root.
  #[serde(default = "default_lint_rules")]
  pub lint_rules: String,

  /// Extra preprocessor extensions per content kind.
  #[serde(default)]
  pub extensions: BTreeMap<String, Vec<String>>,

  /// Module names the app provides itself; addons never link them.
  #[serde(default)]
  pub whitelist: Vec<String>,

  /// Environment name passed to addon config modules.
  #[serde(default = "default_environment")]
  pub environment: String,
}

impl Default for ProjectOptions {
  fn default() -> Self {
    Self {
      name: None,
      lint: default_lint(),
      lint_rules: default_lint_rules(),
      extensions: BTreeMap::new(),
      whitelist: Vec::new(),
      environment: default_environment(),
    }
  }
}

impl ProjectOptions {
  /// Options from a manifest's `quilt` value; absent means defaults.
  pub fn from_value(value: Option<&serde_json::Value>) -> Result<Self, serde_json::Error> {
    match value {
      Some(value) => Self::deserialize(value),
      None => Ok(Self::default()),
    }
  }
}
