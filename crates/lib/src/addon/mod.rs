//! Addons and their composition into content trees.
//!
//! An [`Addon`] knows where each content [`Category`] lives under its root and
//! which hooks transform it. A [`TreeComposer`] turns one category of one
//! addon into a [`Tree`](crate::tree::Tree), bundling the addon's scripts and
//! claiming their module names in the shared
//! [`ModuleWhitelist`](crate::whitelist::ModuleWhitelist).

mod compose;
mod descriptor;
mod hooks;
mod types;

pub use compose::TreeComposer;
pub use descriptor::{Addon, AddonSpec, ModuleMap};
pub use hooks::{NativeHook, TreeHook, TreeHooks};
pub use types::{AddonError, Category};

use crate::consts::{ADDON_ENV_DEVELOPMENT, ADDON_ENV_VAR};

/// Whether `QUILT_ADDON_ENV` selects development mode.
pub fn is_development_env() -> bool {
  std::env::var(ADDON_ENV_VAR).is_ok_and(|v| v == ADDON_ENV_DEVELOPMENT)
}
