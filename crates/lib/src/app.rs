//! The application that owns a set of addons.

use std::path::{Path, PathBuf};

use mlua::prelude::*;
use serde::Serialize;

use crate::config::ProjectOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintSettings {
  pub enabled: bool,
  pub rules_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct App {
  pub name: String,
  pub root: PathBuf,
  pub lint: LintSettings,
}

impl App {
  pub fn new(name: &str, root: &Path) -> Self {
    Self::from_options(name, root, &ProjectOptions::default())
  }

  /// Build the app rooted at `root`. `options.name` wins over `fallback_name`.
  pub fn from_options(fallback_name: &str, root: &Path, options: &ProjectOptions) -> Self {
    Self {
      name: options.name.clone().unwrap_or_else(|| fallback_name.to_string()),
      root: root.to_path_buf(),
      lint: LintSettings {
        enabled: options.lint,
        rules_path: root.join(&options.lint_rules),
      },
    }
  }
}

/// Apps cross into Lua as plain tables (`name`, `root`, `lint`).
impl IntoLua for App {
  fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
    lua.to_value(&self)
  }
}
