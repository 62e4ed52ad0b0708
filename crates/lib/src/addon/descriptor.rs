//! A single addon: identity, directory layout and memoized module state.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use super::hooks::TreeHooks;
use super::is_development_env;
use super::types::{AddonError, Category};
use crate::app::App;
use crate::consts::{BLUEPRINTS_DIR, CONFIG_MODULE, DEFAULT_EXPORT};
use crate::lua::loaders;
use crate::registry::{self, Registry};
use crate::tree::WatchMode;

/// Module name to export names, ordered by module name.
pub type ModuleMap = BTreeMap<String, Vec<String>>;

/// Everything needed to construct an [`Addon`].
#[derive(Debug, Default, Clone)]
pub struct AddonSpec {
  pub name: Option<String>,
  pub root: PathBuf,
  /// Source of the module name instead of `name`.
  pub module_prefix: Option<String>,
  pub tree_hooks: TreeHooks,
  /// `function(app)` called once when the addon is included.
  pub included: Option<LuaFunction>,
}

impl AddonSpec {
  pub fn new(name: &str, root: &Path) -> Self {
    Self {
      name: Some(name.to_string()),
      root: root.to_path_buf(),
      ..Default::default()
    }
  }
}

#[derive(Debug)]
pub struct Addon {
  name: String,
  root: PathBuf,
  module_prefix: Option<String>,
  tree_hooks: TreeHooks,
  included_hook: Option<LuaFunction>,
  registry: Rc<Registry>,
  app: OnceCell<Rc<App>>,
  module_name: OnceCell<String>,
  included_modules: OnceCell<ModuleMap>,
}

/// Lowercase `name` and replace every whitespace character with `-`.
fn slugify(name: &str) -> String {
  name
    .chars()
    .map(|c| if c.is_whitespace() { '-' } else { c })
    .collect::<String>()
    .to_lowercase()
}

impl Addon {
  pub fn new(spec: AddonSpec, registry: Rc<Registry>) -> Result<Self, AddonError> {
    let name = spec
      .name
      .filter(|n| !n.trim().is_empty())
      .ok_or_else(|| AddonError::MissingName { root: spec.root.clone() })?;

    Ok(Self {
      name,
      root: spec.root,
      module_prefix: spec.module_prefix,
      tree_hooks: spec.tree_hooks,
      included_hook: spec.included,
      registry,
      app: OnceCell::new(),
      module_name: OnceCell::new(),
      included_modules: OnceCell::new(),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Rename the addon. The module name is unaffected once computed.
  pub fn set_name(&mut self, name: &str) {
    self.name = name.to_string();
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn tree_hooks(&self) -> &TreeHooks {
    &self.tree_hooks
  }

  /// Read from the environment on every call.
  pub fn is_developing_addon(&self) -> bool {
    is_development_env()
  }

  pub fn watch_mode(&self) -> WatchMode {
    if self.is_developing_addon() {
      WatchMode::Watched
    } else {
      WatchMode::Frozen
    }
  }

  pub fn module_name(&self) -> &str {
    self
      .module_name
      .get_or_init(|| slugify(self.module_prefix.as_deref().unwrap_or(&self.name)))
  }

  pub fn tree_path(&self, category: Category) -> PathBuf {
    self.root.join(category.relative_path())
  }

  pub fn blueprints_path(&self) -> Option<PathBuf> {
    let path = self.root.join(BLUEPRINTS_DIR);
    path.is_dir().then_some(path)
  }

  pub fn app(&self) -> Result<&Rc<App>, AddonError> {
    self.app.get().ok_or_else(|| AddonError::NotIncluded(self.name.clone()))
  }

  /// Bind the owning app. Runs the definition's `included` hook, if any.
  pub fn included(&self, app: Rc<App>) -> Result<(), AddonError> {
    self
      .app
      .set(app.clone())
      .map_err(|_| AddonError::AlreadyIncluded(self.name.clone()))?;

    if let Some(hook) = &self.included_hook {
      hook.call::<()>(App::clone(&app))?;
    }
    debug!(addon = %self.name, app = %app.name, "addon included");
    Ok(())
  }

  /// Evaluate `config/environment.lua` with `(env, base_config)`.
  ///
  /// Returns `None` when the module is absent or returns `nil`.
  pub fn config(
    &self,
    lua: &Lua,
    env: &str,
    base_config: &serde_json::Value,
  ) -> Result<Option<serde_json::Value>, AddonError> {
    let path = self.root.join(CONFIG_MODULE);
    if !path.is_file() {
      return Ok(None);
    }

    let config_fn = match loaders::load_package_file(lua, &path, &self.root)? {
      LuaValue::Function(f) => f,
      other => {
        return Err(AddonError::InvalidDefinition(format!(
          "{} must return a function, got {}",
          path.display(),
          other.type_name()
        )));
      }
    };

    let result: LuaValue = config_fn.call((env, lua.to_value(base_config)?))?;
    if result.is_nil() {
      return Ok(None);
    }

    lua
      .from_value(result)
      .map(Some)
      .map_err(|e| AddonError::Config {
        addon: self.name.clone(),
        message: e.to_string(),
      })
  }

  /// Glob matching every script file the registry knows about.
  pub fn js_file_glob(&self) -> String {
    format!("**/*.+({})", self.registry.extensions_for_type(registry::JS).join("|"))
  }

  /// Modules provided by this addon's `addon/` directory, computed once.
  pub fn included_modules(&self) -> Result<&ModuleMap, AddonError> {
    if let Some(modules) = self.included_modules.get() {
      return Ok(modules);
    }
    let modules = self.scan_modules()?;
    Ok(self.included_modules.get_or_init(|| modules))
  }

  fn scan_modules(&self) -> Result<ModuleMap, AddonError> {
    let source_dir = self.tree_path(Category::Addon);
    let module_name = self.module_name();
    let mut modules = ModuleMap::new();
    if !source_dir.is_dir() {
      return Ok(modules);
    }

    let mut extensions = self.registry.extensions_for_type(registry::JS);
    extensions.sort_by_key(|e| std::cmp::Reverse(e.len()));

    for entry in WalkDir::new(&source_dir).follow_links(true).sort_by_file_name() {
      let entry = entry.map_err(|source| AddonError::Scan {
        path: source_dir.clone(),
        source,
      })?;
      if !entry.file_type().is_file() {
        continue;
      }

      let Ok(relative) = entry.path().strip_prefix(&source_dir) else {
        continue;
      };
      let Some(relative) = relative.to_str() else {
        debug!(addon = %self.name, path = %entry.path().display(), "skipping non-UTF-8 module path");
        continue;
      };
      let relative = relative.replace('\\', "/");
      let stem = extensions
        .iter()
        .find_map(|ext| relative.strip_suffix(&format!(".{}", ext)));

      if let Some(stem) = stem {
        modules.insert(format!("{}/{}", module_name, stem), vec![DEFAULT_EXPORT.to_string()]);
      }
    }

    if modules.contains_key(&format!("{}/index", module_name)) {
      modules.insert(module_name.to_string(), vec![DEFAULT_EXPORT.to_string()]);
    }

    debug!(addon = %self.name, count = modules.len(), "scanned addon modules");
    Ok(modules)
  }
}
