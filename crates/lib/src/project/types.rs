use std::collections::BTreeMap;
use std::path::PathBuf;

use mlua::prelude::*;
use serde::Serialize;

use crate::addon::{AddonError, Category};
use crate::manifest::ManifestError;
use crate::resolver::ResolveError;
use crate::tree::{StageError, Tree};
use crate::util::hash::{HashError, ObjectHash};
use crate::whitelist::ModuleWhitelist;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("invalid \"quilt\" options in {}: {source}", path.display())]
  Options {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("addon '{name}' found twice: {} and {}", first.display(), second.display())]
  DuplicateAddon { name: String, first: PathBuf, second: PathBuf },

  #[error("addon ordering cycle between: {}", .0.join(", "))]
  AddonCycle(Vec<String>),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Addon(#[from] AddonError),

  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error("failed to hash tree: {0}")]
  Hash(#[from] HashError),
}

/// One addon's contribution to a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddonTree {
  pub addon: String,
  pub hash: ObjectHash,
  pub tree: Tree,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPlan {
  /// Non-empty contributions, in addon order.
  pub addons: Vec<AddonTree>,
  pub merged: Tree,
}

/// The result of one composition pass over every public category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPlan {
  pub categories: BTreeMap<Category, CategoryPlan>,
  pub whitelist: ModuleWhitelist,
}

impl BuildPlan {
  pub fn category(&self, category: Category) -> Option<&CategoryPlan> {
    self.categories.get(&category)
  }
}
