//! Shared registry of module names claimed during a composition pass.
//!
//! Every addon bundle links against modules provided elsewhere in the build.
//! Names claimed by an earlier addon (or seeded by the app) are left
//! unresolved by later bundles. Claims are additive: an entry is never
//! removed or reassigned within a pass, so the first claimant owns a name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::consts::APP_CLAIMANT;

/// Who claimed a module name, and in which order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
  pub addon: String,
  pub seq: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleWhitelist {
  claims: BTreeMap<String, Claim>,
  #[serde(skip)]
  next_seq: u64,
}

impl ModuleWhitelist {
  pub fn new() -> Self {
    Self::default()
  }

  /// A whitelist with `modules` already claimed by the app.
  pub fn seeded<I, S>(modules: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut whitelist = Self::new();
    whitelist.claim_all(APP_CLAIMANT, modules);
    whitelist
  }

  pub fn contains(&self, module: &str) -> bool {
    self.claims.contains_key(module)
  }

  pub fn claimant(&self, module: &str) -> Option<&str> {
    self.claims.get(module).map(|c| c.addon.as_str())
  }

  pub fn claims(&self) -> &BTreeMap<String, Claim> {
    &self.claims
  }

  pub fn module_names(&self) -> impl Iterator<Item = &str> {
    self.claims.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.claims.len()
  }

  pub fn is_empty(&self) -> bool {
    self.claims.is_empty()
  }

  /// Claim every name in `modules` for `addon`.
  ///
  /// Returns the names that were already claimed by someone else; those keep
  /// their original claimant. Re-claiming one's own name is a no-op.
  pub fn claim_all<I, S>(&mut self, addon: &str, modules: I) -> Vec<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut conflicts = Vec::new();
    for module in modules {
      let module = module.as_ref();
      match self.claims.get(module) {
        Some(claim) if claim.addon == addon => {}
        Some(_) => conflicts.push(module.to_string()),
        None => {
          self.claims.insert(
            module.to_string(),
            Claim {
              addon: addon.to_string(),
              seq: self.next_seq,
            },
          );
          self.next_seq += 1;
        }
      }
    }
    conflicts
  }
}
