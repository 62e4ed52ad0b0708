mod addons;
mod compose;
mod config;
mod info;

pub use addons::cmd_addons;
pub use compose::cmd_compose;
pub use config::cmd_config;
pub use info::cmd_info;

use std::path::Path;

use anyhow::{Context, Result};
use quilt_lib::project::Project;
use tracing::debug;

// Converts library errors to anyhow (they wrap mlua::Error, which is not Send + Sync)
fn lib_err<E: std::fmt::Display>(err: E) -> anyhow::Error {
  anyhow::anyhow!("{}", err)
}

fn load_project(path: &Path) -> Result<Project> {
  debug!(path = %path.display(), "loading project");
  Project::load(path).map_err(lib_err).with_context(|| format!("Failed to load project: {}", path.display()))
}
