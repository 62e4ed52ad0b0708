//! Projects: discovering, ordering and composing a set of addons.
//!
//! [`Project::load`] reads the project's `package.json`, finds its addon
//! packages, orders them and includes each one in the [`App`]. A single
//! [`Project::compose`] pass then builds every public category, threading one
//! [`ModuleWhitelist`] through all addons in order.

mod discover;
mod order;
mod types;

pub use discover::discover_addons;
pub use order::order_addons;
pub use types::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::Lua;
use tracing::{debug, info};

use crate::addon::{Addon, Category, TreeComposer};
use crate::app::App;
use crate::config::ProjectOptions;
use crate::consts::PACKAGE_MANIFEST;
use crate::lua::runtime::create_runtime;
use crate::manifest::PackageManifest;
use crate::registry::Registry;
use crate::resolver;
use crate::tree::{PlanStages, Stages};
use crate::util::hash::Hashable;
use crate::whitelist::ModuleWhitelist;

pub struct Project {
  root: PathBuf,
  options: ProjectOptions,
  app: Rc<App>,
  stages: Rc<dyn Stages>,
  addons: Vec<Addon>,
  lua: Lua,
}

impl Project {
  /// Load the project at `root`, recording stages as a [`Tree`](crate::tree::Tree) plan.
  pub fn load(root: &Path) -> Result<Self, ProjectError> {
    Self::load_with_stages(root, Rc::new(PlanStages))
  }

  pub fn load_with_stages(root: &Path, stages: Rc<dyn Stages>) -> Result<Self, ProjectError> {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let manifest_path = root.join(PACKAGE_MANIFEST);
    let manifest = PackageManifest::load(&manifest_path)?;
    let options =
      ProjectOptions::from_value(manifest.quilt.as_ref()).map_err(|source| ProjectError::Options {
        path: manifest_path.clone(),
        source,
      })?;

    let registry = Rc::new(Registry::new().with_extensions(&options.extensions));
    let app = Rc::new(App::from_options(&manifest.name, &root, &options));
    let lua = create_runtime(stages.clone())?;

    let packages = order_addons(discover_addons(&root, &manifest)?)?;
    let mut addons = Vec::with_capacity(packages.len());
    for package in &packages {
      let addon = resolver::lookup(&lua, package)?.build(Rc::clone(&registry))?;
      addon.included(app.clone())?;
      addons.push(addon);
    }

    info!(app = %app.name, addons = addons.len(), "project loaded");

    Ok(Self {
      root,
      options,
      app,
      stages,
      addons,
      lua,
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn app(&self) -> &App {
    &self.app
  }

  pub fn options(&self) -> &ProjectOptions {
    &self.options
  }

  /// Addons in composition order.
  pub fn addons(&self) -> &[Addon] {
    &self.addons
  }

  /// A fresh whitelist holding the modules the app provides itself.
  pub fn seeded_whitelist(&self) -> ModuleWhitelist {
    ModuleWhitelist::seeded(&self.options.whitelist)
  }

  /// Compose every public category in one pass.
  pub fn compose(&self) -> Result<BuildPlan, ProjectError> {
    let mut whitelist = self.seeded_whitelist();
    let mut categories = BTreeMap::new();
    for category in Category::PUBLIC {
      categories.insert(category, self.addon_trees_for(category.as_str(), &mut whitelist)?);
    }

    info!(
      categories = categories.len(),
      modules = whitelist.len(),
      "composition finished"
    );
    Ok(BuildPlan { categories, whitelist })
  }

  /// Compose one category across all addons, in order.
  pub fn addon_trees_for(&self, category: &str, whitelist: &mut ModuleWhitelist) -> Result<CategoryPlan, ProjectError> {
    let mut addons = Vec::new();
    for addon in &self.addons {
      let tree = TreeComposer::new(addon, self.stages.as_ref())?.tree_for(category, whitelist)?;
      if tree.is_empty() {
        continue;
      }
      addons.push(AddonTree {
        addon: addon.name().to_string(),
        hash: tree.compute_hash()?,
        tree,
      });
    }

    debug!(category, contributions = addons.len(), "composed category across addons");
    let merged = self.stages.merge(addons.iter().map(|a| a.tree.clone()).collect())?;
    Ok(CategoryPlan { addons, merged })
  }

  /// Merge every addon's config for `env`, then overlay `base`.
  ///
  /// Later addons override earlier ones key by key; `base` wins over all.
  pub fn addons_config(&self, env: &str, base: &serde_json::Value) -> Result<serde_json::Value, ProjectError> {
    let mut merged = serde_json::Value::Object(serde_json::Map::new());
    for addon in &self.addons {
      if let Some(config) = addon.config(&self.lua, env, base)? {
        deep_merge(&mut merged, config);
      }
    }
    deep_merge(&mut merged, base.clone());
    Ok(merged)
  }
}

/// Merge `overlay` into `target`. Objects merge recursively; anything else
/// replaces.
fn deep_merge(target: &mut serde_json::Value, overlay: serde_json::Value) {
  match (target, overlay) {
    (serde_json::Value::Object(target), serde_json::Value::Object(overlay)) => {
      for (key, value) in overlay {
        match target.get_mut(&key) {
          Some(existing) => deep_merge(existing, value),
          None => {
            target.insert(key, value);
          }
        }
      }
    }
    (target, overlay) => *target = overlay,
  }
}
