//! Per-category tree assembly.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::descriptor::Addon;
use super::hooks::TreeHook;
use super::types::{AddonError, Category};
use crate::app::App;
use crate::consts::STYLES_OUTPUT;
use crate::tree::{AssetKind, BundleOptions, PickOptions, Stages, Tree};
use crate::whitelist::ModuleWhitelist;

const LINT_DESCRIPTION: &str = "Lint - Addon";

/// Composes the trees of one included addon using the given stages.
pub struct TreeComposer<'a> {
  addon: &'a Addon,
  app: &'a App,
  stages: &'a dyn Stages,
}

impl<'a> TreeComposer<'a> {
  pub fn new(addon: &'a Addon, stages: &'a dyn Stages) -> Result<Self, AddonError> {
    let app: &App = addon.app()?;
    Ok(Self { addon, app, stages })
  }

  /// The composite tree this addon contributes to `name`.
  ///
  /// Unknown and internal category names yield an empty merge.
  pub fn tree_for(&self, name: &str, whitelist: &mut ModuleWhitelist) -> Result<Tree, AddonError> {
    let Some(category) = Category::from_name(name).filter(Category::is_public) else {
      debug!(addon = %self.addon.name(), category = name, "not a public category");
      return Ok(self.stages.merge(Vec::new())?);
    };

    let mut branches = Vec::new();
    if let Some(tree) = self.source_tree(category)?
      && let Some(tree) = self.apply_hook(category, tree, whitelist)?
    {
      branches.push(tree);
    }

    if category == Category::App
      && self.addon.is_developing_addon()
      && self.app.lint.enabled
      && let Some(lint) = self.lint_addon_tree()?
    {
      branches.push(lint);
    }

    debug!(addon = %self.addon.name(), category = name, branches = branches.len(), "composed category");
    Ok(self.stages.merge(branches)?)
  }

  fn source_tree(&self, category: Category) -> Result<Option<Tree>, AddonError> {
    let path = self.addon.tree_path(category);
    if !path.exists() {
      return Ok(None);
    }
    Ok(Some(self.stages.directory(&path, self.addon.watch_mode())?))
  }

  fn apply_hook(
    &self,
    category: Category,
    tree: Tree,
    whitelist: &mut ModuleWhitelist,
  ) -> Result<Option<Tree>, AddonError> {
    match self.addon.tree_hooks().get(category) {
      None => Ok(Some(tree)),
      Some(TreeHook::CompileAddon) => self.tree_for_addon(tree, whitelist),
      Some(TreeHook::Lua(func)) => Ok(func.call::<Option<Tree>>(tree)?),
      Some(TreeHook::Native(func)) => func(tree),
    }
  }

  /// Built-in `addon` hook: the script bundle plus compiled addon styles.
  pub fn tree_for_addon(&self, tree: Tree, whitelist: &mut ModuleWhitelist) -> Result<Option<Tree>, AddonError> {
    let mut branches = Vec::new();
    if let Some(bundle) = self.compile_addon(tree, whitelist)? {
      branches.push(bundle);
    }
    let styles = self.source_tree(Category::AddonStyles)?;
    if let Some(styles) = self.compile_styles(styles)? {
      branches.push(styles);
    }
    Ok(Some(self.stages.merge(branches)?))
  }

  /// Bundle the addon's modules and claim them in `whitelist`.
  ///
  /// Returns `None` without touching the whitelist when the addon has no
  /// modules.
  pub fn compile_addon(&self, tree: Tree, whitelist: &mut ModuleWhitelist) -> Result<Option<Tree>, AddonError> {
    let modules = self.addon.included_modules()?;
    if modules.is_empty() {
      debug!(addon = %self.addon.name(), "no modules to bundle");
      return Ok(None);
    }

    let name = self.addon.name();
    let module_name = self.addon.module_name();
    let registry = self.addon.registry();
    let shim_file = format!("{}.js", module_name);

    let scripts = self.stages.pick(
      tree,
      PickOptions::new("/", module_name).with_files(vec![self.addon.js_file_glob()]),
    )?;
    let mut branches = vec![self.stages.preprocess(AssetKind::Js, scripts, "/", name, registry)?];

    let templates = self.source_tree(Category::AddonTemplates)?;
    if let Some(templates) = self.compile_templates(templates)? {
      branches.push(templates);
    }
    branches.push(self.stages.reexport(module_name, &shim_file)?);

    let mut ignored_modules: BTreeSet<String> = whitelist.module_names().map(str::to_string).collect();
    ignored_modules.insert(module_name.to_string());

    let merged = self.stages.merge(branches)?;
    let bundle = self.stages.bundle(
      merged,
      BundleOptions {
        input_files: vec![format!("{}/**/*.js", module_name), shim_file],
        output_file: format!("/{}.js", module_name),
        ignored_modules,
      },
    )?;

    for module in whitelist.claim_all(name, modules.keys()) {
      warn!(
        addon = %name,
        module = %module,
        claimed_by = %whitelist.claimant(&module).unwrap_or_default(),
        "module already claimed by another addon"
      );
    }

    Ok(Some(bundle))
  }

  /// Preprocess addon styles and rename the output to `<name>.css`.
  pub fn compile_styles(&self, tree: Option<Tree>) -> Result<Option<Tree>, AddonError> {
    let Some(tree) = tree else {
      return Ok(None);
    };
    let processed = self
      .stages
      .preprocess(AssetKind::Css, tree, "/", "/", self.addon.registry())?;
    let renamed = self
      .stages
      .rename(processed, STYLES_OUTPUT, &format!("{}.css", self.addon.name()))?;
    Ok(Some(renamed))
  }

  /// Place standard templates under `<name>/templates` and pod templates
  /// under `<name>/`, then preprocess both.
  pub fn compile_templates(&self, tree: Option<Tree>) -> Result<Option<Tree>, AddonError> {
    let Some(tree) = tree else {
      return Ok(None);
    };
    let name = self.addon.name();

    let standard = self
      .stages
      .pick(tree.clone(), PickOptions::new("/", &format!("{}/templates", name)))?;
    let pods = self.stages.pick(
      tree,
      PickOptions::new("/", &format!("{}/", name))
        .with_files(vec!["**/template.*".to_string()])
        .allow_empty(),
    )?;

    let merged = self.stages.merge(vec![standard, pods])?;
    Ok(Some(self.stages.preprocess(
      AssetKind::Templates,
      merged,
      "/",
      "/",
      self.addon.registry(),
    )?))
  }

  /// Lint results for the addon's scripts, placed under `<name>/tests/`.
  pub fn lint_addon_tree(&self) -> Result<Option<Tree>, AddonError> {
    let Some(source) = self.source_tree(Category::Addon)? else {
      return Ok(None);
    };

    let scripts = self.stages.pick(
      source,
      PickOptions::new("/", self.addon.module_name()).with_files(vec![self.addon.js_file_glob()]),
    )?;
    let linted = self.stages.lint(scripts, &self.app.lint.rules_path, LINT_DESCRIPTION)?;
    let placed = self
      .stages
      .pick(linted, PickOptions::new("/", &format!("{}/tests/", self.addon.name())))?;
    Ok(Some(placed))
  }
}
