use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::registry;
use crate::util::hash::Hashable;

/// How a source directory participates in rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchMode {
  /// Live handle; the rebuild engine watches it for changes.
  Watched,
  /// Immutable snapshot; releasing it is a no-op.
  Frozen,
}

impl WatchMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      WatchMode::Watched => "watched",
      WatchMode::Frozen => "frozen",
    }
  }
}

/// Content kind handled by a preprocessing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
  Js,
  Css,
  Templates,
}

impl AssetKind {
  /// The registry kind this asset kind draws its extensions from.
  pub fn registry_kind(&self) -> &'static str {
    match self {
      AssetKind::Js => registry::JS,
      AssetKind::Css => registry::CSS,
      AssetKind::Templates => registry::TEMPLATE,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickOptions {
  pub src_dir: String,
  pub dest_dir: String,
  pub files: Option<Vec<String>>,
  pub allow_empty: bool,
}

impl PickOptions {
  pub fn new(src_dir: &str, dest_dir: &str) -> Self {
    Self {
      src_dir: src_dir.to_string(),
      dest_dir: dest_dir.to_string(),
      files: None,
      allow_empty: false,
    }
  }

  pub fn with_files(mut self, files: Vec<String>) -> Self {
    self.files = Some(files);
    self
  }

  pub fn allow_empty(mut self) -> Self {
    self.allow_empty = true;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcatOptions {
  pub input_files: Vec<String>,
  pub output_file: String,
  pub allow_none: bool,
}

impl ConcatOptions {
  pub fn new(input_files: Vec<String>, output_file: &str) -> Self {
    Self {
      input_files,
      output_file: output_file.to_string(),
      allow_none: false,
    }
  }

  pub fn allow_none(mut self) -> Self {
    self.allow_none = true;
    self
  }
}

/// Options for linking a tree of ES modules into one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleOptions {
  pub input_files: Vec<String>,
  pub output_file: String,
  /// Modules the linker must leave unresolved.
  pub ignored_modules: BTreeSet<String>,
}

/// A lazily materialized filesystem subtree.
///
/// Every variant describes work for the external tree-execution engine;
/// building a `Tree` never reads or writes files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Tree {
  Empty,
  Source {
    path: PathBuf,
    watch: WatchMode,
  },
  Merge {
    inputs: Vec<Tree>,
  },
  Pick {
    input: Box<Tree>,
    options: PickOptions,
  },
  Rename {
    input: Box<Tree>,
    src_file: String,
    dest_file: String,
  },
  Concat {
    input: Box<Tree>,
    options: ConcatOptions,
  },
  Preprocess {
    kind: AssetKind,
    input: Box<Tree>,
    src_dir: String,
    dest_dir: String,
    extensions: Vec<String>,
  },
  Lint {
    input: Box<Tree>,
    rules_path: PathBuf,
    description: String,
  },
  Bundle {
    input: Box<Tree>,
    options: BundleOptions,
  },
  /// A single generated file.
  File {
    path: String,
    contents: String,
  },
}

impl Hashable for Tree {}

impl Tree {
  /// Short name of the outermost operation.
  pub fn op(&self) -> &'static str {
    match self {
      Tree::Empty => "empty",
      Tree::Source { .. } => "source",
      Tree::Merge { .. } => "merge",
      Tree::Pick { .. } => "pick",
      Tree::Rename { .. } => "rename",
      Tree::Concat { .. } => "concat",
      Tree::Preprocess { .. } => "preprocess",
      Tree::Lint { .. } => "lint",
      Tree::Bundle { .. } => "bundle",
      Tree::File { .. } => "file",
    }
  }

  /// True when the tree is known to contribute no files without materializing it.
  pub fn is_empty(&self) -> bool {
    match self {
      Tree::Empty => true,
      Tree::Merge { inputs } => inputs.iter().all(Tree::is_empty),
      _ => false,
    }
  }

  /// Every source directory this tree reads from, in plan order.
  pub fn sources(&self) -> Vec<(&PathBuf, WatchMode)> {
    let mut out = Vec::new();
    self.collect_sources(&mut out);
    out
  }

  fn collect_sources<'a>(&'a self, out: &mut Vec<(&'a PathBuf, WatchMode)>) {
    match self {
      Tree::Source { path, watch } => out.push((path, *watch)),
      Tree::Merge { inputs } => inputs.iter().for_each(|t| t.collect_sources(out)),
      Tree::Pick { input, .. }
      | Tree::Rename { input, .. }
      | Tree::Concat { input, .. }
      | Tree::Preprocess { input, .. }
      | Tree::Lint { input, .. }
      | Tree::Bundle { input, .. } => input.collect_sources(out),
      Tree::Empty | Tree::File { .. } => {}
    }
  }
}

/// Error raised by a pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
  #[error("{stage} stage failed: {message}")]
  Failed { stage: &'static str, message: String },
}
