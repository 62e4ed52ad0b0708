//! File loading with per-file `__dir` injection.
//!
//! Addon definitions and config modules are evaluated in an environment that
//! exposes `__dir`, the directory of the file being run, so scripts can build
//! paths relative to themselves (`quilt.tree.dir(__dir .. "/vendor")`).
//!
//! `require` keeps its normal resolution and caching; only the Lua file
//! searcher (`package.searchers[2]`) is replaced so required files get `__dir`
//! too. `dofile` is replaced so relative paths resolve against the calling
//! file's directory.
//!
//! Files loaded with [`load_package_file`] belong to a package. Their
//! environment carries its own `require`, which searches the package
//! directory first and caches modules by canonical file path, so two packages
//! that both `require('helpers')` each get their own module.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;

/// Registry key holding the directory of the file currently being loaded.
const CURRENT_DIR_KEY: &str = "__quilt_current_dir";

/// Registry key of the table caching package modules by canonical path.
const PACKAGE_MODULES_KEY: &str = "__quilt_package_modules";

fn read_chunk(path: &Path) -> LuaResult<(PathBuf, String, String)> {
  let canonical_path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot resolve '{}': {}", path.display(), e)))?;

  let content = fs::read_to_string(&canonical_path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical_path.display(), e)))?;

  let dir = canonical_path
    .parent()
    .unwrap_or(Path::new("."))
    .to_string_lossy()
    .into_owned();

  Ok((canonical_path, content, dir))
}

fn dir_environment(lua: &Lua, dir: &str, package_root: Option<&Path>) -> LuaResult<LuaTable> {
  let env = lua.create_table()?;
  env.set("__dir", dir)?;
  if let Some(root) = package_root {
    env.set("require", create_package_require(lua, root)?)?;
    env.set("dofile", create_dofile(lua, Some(root.to_path_buf()))?)?;
  }

  let mt = lua.create_table()?;
  mt.set("__index", lua.globals())?;
  mt.set("__newindex", lua.globals())?;
  env.set_metatable(Some(mt))?;
  Ok(env)
}

/// Evaluate a Lua file with `__dir` set to its parent directory.
///
/// Returns whatever the chunk returns.
pub fn load_file_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  load_chunk(lua, path, None)
}

/// Evaluate a file belonging to the package at `package_root`.
///
/// Like [`load_file_with_dir`], but `require` and `dofile` inside the file
/// (and inside everything it loads) resolve against the package first.
pub fn load_package_file(lua: &Lua, path: &Path, package_root: &Path) -> LuaResult<LuaValue> {
  load_chunk(lua, path, Some(package_root))
}

fn load_chunk(lua: &Lua, path: &Path, package_root: Option<&Path>) -> LuaResult<LuaValue> {
  let (canonical_path, content, dir) = read_chunk(path)?;

  let prev_dir: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
  lua.set_named_registry_value(CURRENT_DIR_KEY, dir.as_str())?;

  let env = dir_environment(lua, &dir, package_root)?;
  let result = lua
    .load(&content)
    .set_name(format!("@{}", canonical_path.display()))
    .set_environment(env)
    .eval::<LuaValue>();

  // Restore even on failure so the original error is what surfaces.
  let _ = lua.set_named_registry_value(CURRENT_DIR_KEY, prev_dir);

  result
}

/// Resolve `path_str` against the directory of the file currently loading,
/// falling back to the path as given.
fn resolve_relative(lua: &Lua, path_str: &str) -> LuaResult<PathBuf> {
  let path = Path::new(path_str);
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }

  let current: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
  if let Some(current_dir) = current {
    let resolved = Path::new(&current_dir).join(path);
    if resolved.exists() {
      return Ok(resolved);
    }
  }

  Ok(path.to_path_buf())
}

fn create_lua_searcher(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, modname: String| {
    let package: LuaTable = lua.globals().get("package")?;
    let search_path: String = package.get("path")?;
    let searchpath: LuaFunction = package.get("searchpath")?;
    let found: LuaMultiValue = searchpath.call((modname.clone(), search_path))?;

    match found.into_iter().next() {
      Some(LuaValue::String(filepath)) => {
        let filepath = filepath.to_str()?.to_string();
        let target = filepath.clone();
        let loader = lua.create_function(move |lua, _: LuaMultiValue| load_file_with_dir(lua, Path::new(&target)))?;
        Ok((LuaValue::Function(loader), filepath))
      }
      _ => Ok((LuaValue::Nil, format!("\n\tno file for module '{}'", modname))),
    }
  })
}

fn package_modules(lua: &Lua) -> LuaResult<LuaTable> {
  if let Some(modules) = lua.named_registry_value::<Option<LuaTable>>(PACKAGE_MODULES_KEY)? {
    return Ok(modules);
  }
  let modules = lua.create_table()?;
  lua.set_named_registry_value(PACKAGE_MODULES_KEY, modules.clone())?;
  Ok(modules)
}

/// A `require` that looks in `package_root` before the global searchers.
fn create_package_require(lua: &Lua, package_root: &Path) -> LuaResult<LuaFunction> {
  let root = package_root.to_path_buf();
  let dir = root.to_string_lossy().replace('\\', "/");
  let template = format!("{dir}/?.lua;{dir}/?/init.lua");

  lua.create_function(move |lua, modname: String| {
    let package: LuaTable = lua.globals().get("package")?;
    let searchpath: LuaFunction = package.get("searchpath")?;
    let found: LuaMultiValue = searchpath.call((modname.as_str(), template.as_str()))?;

    let Some(LuaValue::String(filepath)) = found.into_iter().next() else {
      let require: LuaFunction = lua.globals().get("require")?;
      return require.call::<LuaValue>(modname);
    };

    let filepath = PathBuf::from(filepath.to_str()?.to_string());
    let key = dunce::canonicalize(&filepath)
      .unwrap_or_else(|_| filepath.clone())
      .to_string_lossy()
      .into_owned();

    let modules = package_modules(lua)?;
    let cached: LuaValue = modules.get(key.as_str())?;
    if !cached.is_nil() {
      return Ok(cached);
    }

    let value = match load_chunk(lua, &filepath, Some(root.as_path()))? {
      LuaValue::Nil => LuaValue::Boolean(true),
      value => value,
    };
    modules.set(key, value.clone())?;
    Ok(value)
  })
}

fn create_dofile(lua: &Lua, package_root: Option<PathBuf>) -> LuaResult<LuaFunction> {
  lua.create_function(move |lua, path: Option<String>| match path {
    Some(path_str) => {
      let resolved = resolve_relative(lua, &path_str)?;
      load_chunk(lua, &resolved, package_root.as_deref())
    }
    None => Err(LuaError::external("dofile() without path not supported")),
  })
}

/// Install the `__dir`-aware searcher and `dofile` into the runtime.
pub fn install_loaders(lua: &Lua) -> LuaResult<()> {
  let package: LuaTable = lua.globals().get("package")?;
  let searchers: LuaTable = package.get("searchers")?;
  searchers.set(2, create_lua_searcher(lua)?)?;

  lua.globals().set("dofile", create_dofile(lua, None)?)?;
  Ok(())
}
