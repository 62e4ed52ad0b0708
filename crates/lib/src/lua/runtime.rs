use std::rc::Rc;

use mlua::prelude::*;

use crate::lua::{globals, loaders};
use crate::tree::Stages;

/// Create a Lua runtime for evaluating addon definitions and config modules.
///
/// Installs the `__dir`-aware loaders and registers the `quilt` global, whose
/// tree helpers call into `stages`.
pub fn create_runtime(stages: Rc<dyn Stages>) -> LuaResult<Lua> {
  let lua = Lua::new();
  loaders::install_loaders(&lua)?;
  globals::register_globals(&lua, stages)?;
  Ok(lua)
}
