use std::path::PathBuf;

use mlua::prelude::*;
use serde::Serialize;

use crate::tree::StageError;

/// A content category an addon can contribute.
///
/// Seven categories are public and accepted by
/// [`TreeComposer::tree_for`](super::TreeComposer::tree_for); `AddonStyles`
/// and `AddonTemplates` are only read while compiling the `addon` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  App,
  Styles,
  Templates,
  Addon,
  AddonStyles,
  AddonTemplates,
  Vendor,
  TestSupport,
  Public,
}

impl Category {
  /// Public categories, in composition order.
  pub const PUBLIC: [Category; 7] = [
    Category::App,
    Category::Styles,
    Category::Templates,
    Category::Addon,
    Category::Vendor,
    Category::TestSupport,
    Category::Public,
  ];

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "app" => Some(Category::App),
      "styles" => Some(Category::Styles),
      "templates" => Some(Category::Templates),
      "addon" => Some(Category::Addon),
      "addon-styles" => Some(Category::AddonStyles),
      "addon-templates" => Some(Category::AddonTemplates),
      "vendor" => Some(Category::Vendor),
      "test-support" => Some(Category::TestSupport),
      "public" => Some(Category::Public),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::App => "app",
      Category::Styles => "styles",
      Category::Templates => "templates",
      Category::Addon => "addon",
      Category::AddonStyles => "addon-styles",
      Category::AddonTemplates => "addon-templates",
      Category::Vendor => "vendor",
      Category::TestSupport => "test-support",
      Category::Public => "public",
    }
  }

  /// Directory of this category, relative to the addon root.
  pub fn relative_path(&self) -> &'static str {
    match self {
      Category::App => "app",
      Category::Styles => "app/styles",
      Category::Templates => "app/templates",
      Category::Addon => "addon",
      Category::AddonStyles => "addon/styles",
      Category::AddonTemplates => "addon/templates",
      Category::Vendor => "vendor",
      Category::TestSupport => "test-support",
      Category::Public => "public",
    }
  }

  pub fn is_public(&self) -> bool {
    Self::PUBLIC.contains(self)
  }
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Errors raised while constructing or composing an addon.
#[derive(Debug, thiserror::Error)]
pub enum AddonError {
  #[error("addon at {} is missing a name", root.display())]
  MissingName { root: PathBuf },

  #[error("addon '{0}' has not been included in an app")]
  NotIncluded(String),

  #[error("addon '{0}' is already included in an app")]
  AlreadyIncluded(String),

  #[error("invalid addon definition: {0}")]
  InvalidDefinition(String),

  #[error("failed to scan {}: {source}", path.display())]
  Scan {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to convert config for addon '{addon}': {message}")]
  Config { addon: String, message: String },

  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  #[error(transparent)]
  Stage(#[from] StageError),
}
