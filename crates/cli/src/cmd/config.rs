//! Implementation of the `quilt config` command.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::output::print_json;

pub fn cmd_config(project: &Path, environment: Option<&str>) -> Result<()> {
  let project = super::load_project(project)?;
  let environment = environment.unwrap_or(project.options().environment.as_str());

  let config = project
    .addons_config(environment, &json!({ "environment": environment }))
    .map_err(super::lib_err)
    .with_context(|| format!("Failed to evaluate addon config for '{}'", environment))?;
  print_json(&config)
}
