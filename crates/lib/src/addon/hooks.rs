//! Per-category tree hooks.
//!
//! A hook receives the tree of one category and returns a replacement, or
//! nothing to drop the category from the addon's output. Categories without
//! a hook pass through unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use mlua::prelude::*;

use super::types::{AddonError, Category};
use crate::tree::Tree;

pub type NativeHook = Rc<dyn Fn(Tree) -> Result<Option<Tree>, AddonError>>;

#[derive(Clone)]
pub enum TreeHook {
  /// Built-in `addon` handling: bundle scripts and compile addon styles.
  CompileAddon,
  /// `function(tree) -> tree | nil` from an addon definition.
  Lua(LuaFunction),
  Native(NativeHook),
}

impl fmt::Debug for TreeHook {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TreeHook::CompileAddon => f.write_str("CompileAddon"),
      TreeHook::Lua(_) => f.write_str("Lua(<function>)"),
      TreeHook::Native(_) => f.write_str("Native(<fn>)"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct TreeHooks {
  hooks: BTreeMap<Category, TreeHook>,
}

impl Default for TreeHooks {
  fn default() -> Self {
    Self {
      hooks: BTreeMap::from([(Category::Addon, TreeHook::CompileAddon)]),
    }
  }
}

impl TreeHooks {
  /// A table with no hooks at all, not even the built-in one.
  pub fn empty() -> Self {
    Self { hooks: BTreeMap::new() }
  }

  pub fn get(&self, category: Category) -> Option<&TreeHook> {
    self.hooks.get(&category)
  }

  pub fn set(&mut self, category: Category, hook: TreeHook) {
    self.hooks.insert(category, hook);
  }

  pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
    self.hooks.keys().copied()
  }

  /// Read a `tree_for` table of Lua hooks on top of the defaults.
  ///
  /// Only public categories are accepted.
  pub fn from_lua_table(table: Option<LuaTable>) -> Result<Self, AddonError> {
    let mut hooks = Self::default();
    let Some(table) = table else {
      return Ok(hooks);
    };

    for pair in table.pairs::<String, LuaFunction>() {
      let (name, func) = pair?;
      let category = Category::from_name(&name)
        .filter(Category::is_public)
        .ok_or_else(|| AddonError::InvalidDefinition(format!("unknown tree_for category '{}'", name)))?;
      hooks.set(category, TreeHook::Lua(func));
    }
    Ok(hooks)
  }
}
