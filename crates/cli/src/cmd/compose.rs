//! Implementation of the `quilt compose` command.

use std::path::Path;

use anyhow::{Context, Result, bail};
use quilt_lib::addon::Category;

use crate::output::print_json;

pub fn cmd_compose(project: &Path, category: Option<&str>) -> Result<()> {
  let project = super::load_project(project)?;

  let Some(name) = category else {
    let plan = project.compose().map_err(super::lib_err).context("Failed to compose project")?;
    return print_json(&plan);
  };

  let Some(category) = Category::from_name(name).filter(Category::is_public) else {
    let known: Vec<_> = Category::PUBLIC.iter().map(Category::as_str).collect();
    bail!("Unknown category '{}' (expected one of: {})", name, known.join(", "));
  };

  let mut whitelist = project.seeded_whitelist();
  let plan = project
    .addon_trees_for(category.as_str(), &mut whitelist)
    .map_err(super::lib_err)
    .with_context(|| format!("Failed to compose category '{}'", category))?;
  print_json(&plan)
}
