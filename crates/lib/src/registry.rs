//! Preprocessor extension registry.
//!
//! Each content kind (`js`, `css`, `template`) maps to the file extensions its
//! preprocessors accept. Preprocessors may contribute superset extensions
//! (e.g. `ts` for `js`), which widens what addons are scanned for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const JS: &str = "js";
pub const CSS: &str = "css";
pub const TEMPLATE: &str = "template";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
  extensions: BTreeMap<String, Vec<String>>,
}

impl Default for Registry {
  fn default() -> Self {
    let mut extensions = BTreeMap::new();
    extensions.insert(JS.to_string(), vec!["js".to_string()]);
    extensions.insert(CSS.to_string(), vec!["css".to_string()]);
    extensions.insert(TEMPLATE.to_string(), vec!["hbs".to_string(), "handlebars".to_string()]);
    Self { extensions }
  }
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Extensions registered for `kind`, in registration order. Unknown kinds
  /// have none.
  pub fn extensions_for_type(&self, kind: &str) -> Vec<String> {
    self.extensions.get(kind).cloned().unwrap_or_default()
  }

  /// Register an extension for `kind`. Duplicates and a leading `.` are ignored.
  pub fn add(&mut self, kind: &str, extension: &str) {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
      return;
    }
    let list = self.extensions.entry(kind.to_string()).or_default();
    if !list.iter().any(|e| e == extension) {
      list.push(extension.to_string());
    }
  }

  pub fn with_extensions(mut self, extra: &BTreeMap<String, Vec<String>>) -> Self {
    for (kind, exts) in extra {
      for ext in exts {
        self.add(kind, ext);
      }
    }
    self
  }
}
