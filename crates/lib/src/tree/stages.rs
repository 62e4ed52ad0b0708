//! Pipeline stage operators consumed by tree composition.
//!
//! Composition never implements merging, picking, preprocessing or linking
//! itself; it calls a [`Stages`] implementation handed to it upfront.
//! [`PlanStages`] is the implementation used by the CLI and tests: each call
//! records a node of the lazy [`Tree`] plan and never fails.

use std::path::Path;

use super::types::{AssetKind, BundleOptions, ConcatOptions, PickOptions, StageError, Tree, WatchMode};
use crate::registry::Registry;

pub type StageResult = Result<Tree, StageError>;

pub trait Stages {
  /// Wrap an on-disk directory as a tree.
  fn directory(&self, path: &Path, watch: WatchMode) -> StageResult;

  /// Merge trees into one, keyed by relative path.
  fn merge(&self, trees: Vec<Tree>) -> StageResult;

  fn pick(&self, tree: Tree, options: PickOptions) -> StageResult;

  fn rename(&self, tree: Tree, src_file: &str, dest_file: &str) -> StageResult;

  fn concat(&self, tree: Tree, options: ConcatOptions) -> StageResult;

  /// Run the preprocessors registered for `kind` over `src_dir`, writing to `dest_dir`.
  fn preprocess(&self, kind: AssetKind, tree: Tree, src_dir: &str, dest_dir: &str, registry: &Registry)
  -> StageResult;

  fn lint(&self, tree: Tree, rules_path: &Path, description: &str) -> StageResult;

  /// Link ES modules into a single bundle.
  fn bundle(&self, tree: Tree, options: BundleOptions) -> StageResult;

  /// A file re-exporting the default export of `<module>/index` as `module`.
  fn reexport(&self, module: &str, output_file: &str) -> StageResult;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlanStages;

impl Stages for PlanStages {
  fn directory(&self, path: &Path, watch: WatchMode) -> StageResult {
    Ok(Tree::Source {
      path: path.to_path_buf(),
      watch,
    })
  }

  fn merge(&self, trees: Vec<Tree>) -> StageResult {
    Ok(Tree::Merge {
      inputs: trees.into_iter().filter(|t| !matches!(t, Tree::Empty)).collect(),
    })
  }

  fn pick(&self, tree: Tree, options: PickOptions) -> StageResult {
    Ok(Tree::Pick {
      input: Box::new(tree),
      options,
    })
  }

  fn rename(&self, tree: Tree, src_file: &str, dest_file: &str) -> StageResult {
    Ok(Tree::Rename {
      input: Box::new(tree),
      src_file: src_file.to_string(),
      dest_file: dest_file.to_string(),
    })
  }

  fn concat(&self, tree: Tree, options: ConcatOptions) -> StageResult {
    Ok(Tree::Concat {
      input: Box::new(tree),
      options,
    })
  }

  fn preprocess(
    &self,
    kind: AssetKind,
    tree: Tree,
    src_dir: &str,
    dest_dir: &str,
    registry: &Registry,
  ) -> StageResult {
    Ok(Tree::Preprocess {
      kind,
      input: Box::new(tree),
      src_dir: src_dir.to_string(),
      dest_dir: dest_dir.to_string(),
      extensions: registry.extensions_for_type(kind.registry_kind()),
    })
  }

  fn lint(&self, tree: Tree, rules_path: &Path, description: &str) -> StageResult {
    Ok(Tree::Lint {
      input: Box::new(tree),
      rules_path: rules_path.to_path_buf(),
      description: description.to_string(),
    })
  }

  fn bundle(&self, tree: Tree, options: BundleOptions) -> StageResult {
    Ok(Tree::Bundle {
      input: Box::new(tree),
      options,
    })
  }

  fn reexport(&self, module: &str, output_file: &str) -> StageResult {
    Ok(Tree::File {
      path: output_file.to_string(),
      contents: format!("export {{ default }} from '{}/index';\n", module),
    })
  }
}
