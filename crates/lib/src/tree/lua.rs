//! Lua bindings for trees.
//!
//! This module provides:
//! - `Tree` as LuaUserData, so hooks can receive and return trees
//! - `create_tree_helpers()` building the `quilt.tree` table of stage operators

use std::rc::Rc;

use mlua::prelude::*;

use super::stages::Stages;
use super::types::{ConcatOptions, PickOptions, Tree, WatchMode};

impl LuaUserData for Tree {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("op", |_, this| Ok(this.op()));
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("is_empty", |_, this, ()| Ok(this.is_empty()));

    methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
      serde_json::to_string(this).map_err(LuaError::external)
    });
  }
}

impl FromLua for Tree {
  fn from_lua(value: LuaValue, _lua: &Lua) -> LuaResult<Self> {
    match value {
      LuaValue::UserData(ud) => Ok(Tree::clone(&*ud.borrow::<Tree>()?)),
      _ => Err(LuaError::FromLuaConversionError {
        from: value.type_name(),
        to: "Tree".to_string(),
        message: Some("expected a tree created by quilt.tree".to_string()),
      }),
    }
  }
}

fn parse_pick_opts(opts: Option<LuaTable>) -> LuaResult<PickOptions> {
  let Some(table) = opts else {
    return Ok(PickOptions::new("/", "/"));
  };

  let src_dir: Option<String> = table.get("src_dir")?;
  let dest_dir: Option<String> = table.get("dest_dir")?;
  let mut options = PickOptions::new(src_dir.as_deref().unwrap_or("/"), dest_dir.as_deref().unwrap_or("/"));

  let files: Option<Vec<String>> = table.get("files")?;
  if let Some(files) = files {
    options = options.with_files(files);
  }
  if table.get::<Option<bool>>("allow_empty")?.unwrap_or(false) {
    options = options.allow_empty();
  }
  Ok(options)
}

fn parse_concat_opts(table: LuaTable) -> LuaResult<ConcatOptions> {
  let input_files: Vec<String> = table
    .get("input_files")
    .map_err(|_| LuaError::external("concat requires an 'input_files' list"))?;
  let output_file: String = table
    .get("output_file")
    .map_err(|_| LuaError::external("concat requires an 'output_file' path"))?;

  let mut options = ConcatOptions::new(input_files, &output_file);
  if table.get::<Option<bool>>("allow_none")?.unwrap_or(false) {
    options = options.allow_none();
  }
  Ok(options)
}

/// Create the `quilt.tree` table exposing stage operators to addon scripts.
pub fn create_tree_helpers(lua: &Lua, stages: Rc<dyn Stages>) -> LuaResult<LuaTable> {
  let tree = lua.create_table()?;

  // quilt.tree.empty()
  tree.set("empty", lua.create_function(|_, ()| Ok(Tree::Empty))?)?;

  // quilt.tree.dir(path, watched?)
  let s = stages.clone();
  tree.set(
    "dir",
    lua.create_function(move |_, (path, watched): (String, Option<bool>)| {
      let watch = if watched.unwrap_or(false) {
        WatchMode::Watched
      } else {
        WatchMode::Frozen
      };
      s.directory(std::path::Path::new(&path), watch).map_err(LuaError::external)
    })?,
  )?;

  // quilt.tree.merge({ a, b, ... })
  let s = stages.clone();
  tree.set(
    "merge",
    lua.create_function(move |_, trees: Vec<Tree>| s.merge(trees).map_err(LuaError::external))?,
  )?;

  // quilt.tree.pick(tree, { src_dir, dest_dir, files, allow_empty })
  let s = stages.clone();
  tree.set(
    "pick",
    lua.create_function(move |_, (input, opts): (Tree, Option<LuaTable>)| {
      let options = parse_pick_opts(opts)?;
      s.pick(input, options).map_err(LuaError::external)
    })?,
  )?;

  // quilt.tree.rename(tree, src_file, dest_file)
  let s = stages.clone();
  tree.set(
    "rename",
    lua.create_function(move |_, (input, src, dest): (Tree, String, String)| {
      s.rename(input, &src, &dest).map_err(LuaError::external)
    })?,
  )?;

  // quilt.tree.concat(tree, { input_files, output_file, allow_none })
  let s = stages;
  tree.set(
    "concat",
    lua.create_function(move |_, (input, opts): (Tree, LuaTable)| {
      let options = parse_concat_opts(opts)?;
      s.concat(input, options).map_err(LuaError::external)
    })?,
  )?;

  Ok(tree)
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::tree::PlanStages;

  fn create_test_lua() -> LuaResult<Lua> {
    let lua = Lua::new();
    let quilt = lua.create_table()?;
    quilt.set("tree", create_tree_helpers(&lua, Rc::new(PlanStages))?)?;
    lua.globals().set("quilt", quilt)?;
    Ok(lua)
  }

  mod helpers {
    use super::*;

    #[test]
    fn dir_defaults_to_frozen() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let tree: Tree = lua.load("return quilt.tree.dir('/vendor')").eval()?;
      assert_eq!(
        tree,
        Tree::Source {
          path: PathBuf::from("/vendor"),
          watch: WatchMode::Frozen,
        }
      );
      Ok(())
    }

    #[test]
    fn dir_can_be_watched() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let tree: Tree = lua.load("return quilt.tree.dir('/vendor', true)").eval()?;
      assert_eq!(tree.sources()[0].1, WatchMode::Watched);
      Ok(())
    }

    #[test]
    fn pick_parses_options() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let tree: Tree = lua
        .load(
          r#"
            local src = quilt.tree.dir('/vendor')
            return quilt.tree.pick(src, { dest_dir = 'lib', files = { '**/*.js' }, allow_empty = true })
          "#,
        )
        .eval()?;

      match tree {
        Tree::Pick { options, .. } => {
          assert_eq!(options.src_dir, "/");
          assert_eq!(options.dest_dir, "lib");
          assert_eq!(options.files, Some(vec!["**/*.js".to_string()]));
          assert!(options.allow_empty);
        }
        other => panic!("expected pick, got {:?}", other),
      }
      Ok(())
    }

    #[test]
    fn merge_and_rename_compose() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let tree: Tree = lua
        .load(
          r#"
            local merged = quilt.tree.merge({ quilt.tree.dir('/a'), quilt.tree.empty(), quilt.tree.dir('/b') })
            return quilt.tree.rename(merged, 'a.css', 'b.css')
          "#,
        )
        .eval()?;

      assert_eq!(tree.op(), "rename");
      assert_eq!(tree.sources().len(), 2);
      Ok(())
    }

    #[test]
    fn concat_requires_output_file() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let result = lua
        .load("return quilt.tree.concat(quilt.tree.dir('/a'), { input_files = { '*.js' } })")
        .exec();
      let err = result.unwrap_err().to_string();
      assert!(err.contains("output_file"), "unexpected error: {}", err);
      Ok(())
    }
  }

  mod userdata {
    use super::*;

    #[test]
    fn exposes_op_and_is_empty() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let (op, empty): (String, bool) = lua
        .load("local t = quilt.tree.merge({}) return t.op, t:is_empty()")
        .eval()?;
      assert_eq!(op, "merge");
      assert!(empty);
      Ok(())
    }

    #[test]
    fn tostring_is_json() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let s: String = lua.load("return tostring(quilt.tree.empty())").eval()?;
      assert_eq!(s, r#"{"op":"empty"}"#);
      Ok(())
    }

    #[test]
    fn non_tree_values_are_rejected() -> LuaResult<()> {
      let lua = create_test_lua()?;
      let result = lua.load("return quilt.tree.rename('nope', 'a', 'b')").exec();
      assert!(result.is_err());
      Ok(())
    }
  }
}
