//! Implementation of the `quilt addons` command.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::output::{print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct AddonSummary<'a> {
  name: &'a str,
  module_name: &'a str,
  root: &'a Path,
  watch: &'static str,
  modules: usize,
}

pub fn cmd_addons(project: &Path, json: bool) -> Result<()> {
  let project = super::load_project(project)?;

  let mut summaries = Vec::with_capacity(project.addons().len());
  for addon in project.addons() {
    let modules = addon
      .included_modules()
      .map_err(super::lib_err)
      .with_context(|| format!("Failed to scan modules of addon '{}'", addon.name()))?;
    summaries.push(AddonSummary {
      name: addon.name(),
      module_name: addon.module_name(),
      root: addon.root(),
      watch: addon.watch_mode().as_str(),
      modules: modules.len(),
    });
  }

  if json {
    return print_json(&summaries);
  }

  if summaries.is_empty() {
    print_info(&format!("No addons found for {}", project.app().name));
    return Ok(());
  }

  print_info(&format!("Addons of {} ({})", project.app().name, project.root().display()));
  for summary in &summaries {
    print_success(summary.name);
    print_stat("Module", summary.module_name);
    print_stat("Root", &summary.root.display().to_string());
    print_stat("Watch", summary.watch);
    print_stat("Modules", &summary.modules.to_string());
  }
  Ok(())
}
