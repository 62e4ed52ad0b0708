//! Addon entry point resolution.
//!
//! Given an addon package, [`resolve_path`] finds the Lua file defining the
//! addon and [`lookup`] turns whatever that file returns into an
//! [`AddonFactory`]. Packages without an entry file still act as addons
//! through a generated definition.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::addon::{Addon, AddonError, AddonSpec, TreeHooks};
use crate::consts::{ADDON_MAIN_EXT, DEFAULT_ADDON_MAIN};
use crate::lua::loaders;
use crate::manifest::{AddonPackage, ManifestError, PackageManifest};
use crate::registry::Registry;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("invalid addon definition in {}: {message}", path.display())]
  InvalidDefinition { path: PathBuf, message: String },

  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  #[error(transparent)]
  Addon(#[from] AddonError),
}

/// What an addon entry file provided.
#[derive(Debug, Clone)]
pub enum AddonDefinition {
  /// `function(ctx) -> table`, called with `{ root, package }`.
  Constructor(LuaFunction),
  /// A definition table used as-is.
  Overrides(LuaTable),
  /// No entry file; the package is an addon by manifest alone.
  Generated,
}

impl AddonDefinition {
  pub fn kind(&self) -> &'static str {
    match self {
      AddonDefinition::Constructor(_) => "constructor",
      AddonDefinition::Overrides(_) => "overrides",
      AddonDefinition::Generated => "generated",
    }
  }
}

/// Argument passed to constructor-style definitions.
#[derive(Serialize)]
struct ConstructorContext<'a> {
  root: &'a Path,
  package: &'a PackageManifest,
}

impl IntoLua for ConstructorContext<'_> {
  fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
    lua.to_value(&self)
  }
}

/// Builds [`Addon`] instances for one package, whatever its definition style.
#[derive(Debug, Clone)]
pub struct AddonFactory {
  package: AddonPackage,
  entry: PathBuf,
  entry_dir: PathBuf,
  definition: AddonDefinition,
}

impl AddonFactory {
  pub fn definition(&self) -> &AddonDefinition {
    &self.definition
  }

  pub fn build(&self, registry: Rc<Registry>) -> Result<Addon, ResolveError> {
    let spec = match &self.definition {
      AddonDefinition::Generated => AddonSpec::new(
        &format!("(generated {} addon)", self.package.name()),
        &self.entry_dir,
      ),
      AddonDefinition::Overrides(table) => self.spec_from_table(table, true)?,
      AddonDefinition::Constructor(func) => {
        let context = ConstructorContext {
          root: &self.entry_dir,
          package: &self.package.manifest,
        };
        match func.call::<LuaValue>(context)? {
          LuaValue::Table(table) => self.spec_from_table(&table, false)?,
          other => {
            return Err(ResolveError::InvalidDefinition {
              path: self.entry.clone(),
              message: format!("constructor returned {} instead of a table", other.type_name()),
            });
          }
        }
      }
    };

    Ok(Addon::new(spec, registry)?)
  }

  /// Read a definition table. `force_root` ignores any `root` it sets.
  fn spec_from_table(&self, table: &LuaTable, force_root: bool) -> Result<AddonSpec, ResolveError> {
    let root = match table.get::<Option<String>>("root")? {
      Some(root) if !force_root => self.entry_dir.join(root),
      _ => self.entry_dir.clone(),
    };

    Ok(AddonSpec {
      name: table.get("name")?,
      root,
      module_prefix: table.get("module_prefix")?,
      tree_hooks: TreeHooks::from_lua_table(table.get("tree_for")?)?,
      included: table.get("included")?,
    })
  }
}

/// The absolute path of a package's addon entry file.
///
/// Prefers `quilt-addon.main`, then the deprecated `quilt-addon-main`, then
/// `index.lua`. Paths without an extension get `.lua`.
pub fn resolve_path(package: &AddonPackage) -> PathBuf {
  let manifest = &package.manifest;
  let main = match (manifest.addon.as_ref().and_then(|a| a.main.as_deref()), &manifest.legacy_main) {
    (Some(main), _) => main,
    (None, Some(legacy)) => {
      warn!(
        package = %manifest.name,
        "\"quilt-addon-main\" is deprecated, use \"quilt-addon\": {{ \"main\": \"{}\" }} instead",
        legacy
      );
      legacy.as_str()
    }
    (None, None) => DEFAULT_ADDON_MAIN,
  };

  let mut path = package.path.join(main);
  if path.extension().is_none() {
    path.set_extension(ADDON_MAIN_EXT);
  }
  std::path::absolute(&path).unwrap_or(path)
}

/// Load a package's addon definition into a factory.
pub fn lookup(lua: &Lua, package: &AddonPackage) -> Result<AddonFactory, ResolveError> {
  let entry = resolve_path(package);
  let entry_dir = entry
    .parent()
    .map(Path::to_path_buf)
    .unwrap_or_else(|| package.path.clone());

  let definition = if entry.is_file() {
    match loaders::load_package_file(lua, &entry, &package.path)? {
      LuaValue::Function(func) => AddonDefinition::Constructor(func),
      LuaValue::Table(table) => AddonDefinition::Overrides(table),
      other => {
        return Err(ResolveError::InvalidDefinition {
          path: entry,
          message: format!("expected a function or table, got {}", other.type_name()),
        });
      }
    }
  } else {
    AddonDefinition::Generated
  };

  debug!(
    package = %package.name(),
    entry = %entry.display(),
    kind = definition.kind(),
    "resolved addon definition"
  );

  Ok(AddonFactory {
    package: package.clone(),
    entry,
    entry_dir,
    definition,
  })
}
