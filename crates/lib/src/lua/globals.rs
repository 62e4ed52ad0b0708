//! Global Lua values and the `quilt` table.
//!
//! This module registers the `quilt` global table which provides:
//! - `quilt.version` - Version of the composition engine
//! - `quilt.tree` - Stage operators for building trees in hooks
//! - `quilt.is_developing()` - Whether addons run in development mode

use std::rc::Rc;

use mlua::prelude::*;

use crate::addon::is_development_env;
use crate::tree::Stages;
use crate::tree::lua::create_tree_helpers;

/// Register the `quilt` global table in the Lua runtime.
pub fn register_globals(lua: &Lua, stages: Rc<dyn Stages>) -> LuaResult<()> {
  let quilt = lua.create_table()?;

  quilt.set("version", env!("CARGO_PKG_VERSION"))?;
  quilt.set("tree", create_tree_helpers(lua, stages)?)?;
  quilt.set("is_developing", lua.create_function(|_, ()| Ok(is_development_env()))?)?;

  lua.globals().set("quilt", quilt)?;

  Ok(())
}
