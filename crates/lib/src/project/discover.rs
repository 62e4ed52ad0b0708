//! Finding addon packages from a project manifest.

use std::path::Path;

use tracing::debug;

use super::types::ProjectError;
use crate::consts::{PACKAGE_MANIFEST, PACKAGES_DIR};
use crate::manifest::{AddonPackage, PackageManifest};

fn push_unique(found: &mut Vec<AddonPackage>, package: AddonPackage) -> Result<(), ProjectError> {
  if let Some(existing) = found.iter().find(|p| p.name() == package.name()) {
    return Err(ProjectError::DuplicateAddon {
      name: package.name().to_string(),
      first: existing.path.clone(),
      second: package.path,
    });
  }
  found.push(package);
  Ok(())
}

/// Addon packages of the project at `root`, in discovery order.
///
/// Installed dependencies come first (sorted by name, non-addons skipped),
/// then the in-repo paths listed under `quilt-addon.paths`.
pub fn discover_addons(root: &Path, manifest: &PackageManifest) -> Result<Vec<AddonPackage>, ProjectError> {
  let mut found = Vec::new();

  for name in manifest.dependency_names() {
    let dir = root.join(PACKAGES_DIR).join(name);
    if !dir.join(PACKAGE_MANIFEST).is_file() {
      debug!(package = name, "dependency not installed, skipping");
      continue;
    }

    let package = AddonPackage::load(&dir)?;
    if !package.manifest.is_addon() {
      continue;
    }
    debug!(package = name, path = %dir.display(), "discovered addon dependency");
    push_unique(&mut found, package)?;
  }

  for relative in manifest.addon_paths() {
    let dir = root.join(relative);
    if !dir.join(PACKAGE_MANIFEST).is_file() {
      debug!(path = %dir.display(), "in-repo addon has no manifest, skipping");
      continue;
    }

    let package = AddonPackage::load(&dir)?;
    debug!(package = %package.name(), path = %dir.display(), "discovered in-repo addon");
    push_unique(&mut found, package)?;
  }

  Ok(found)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn write_package(dir: &Path, json: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(PACKAGE_MANIFEST), json).unwrap();
  }

  fn manifest(json: &str) -> PackageManifest {
    PackageManifest::parse(json, Path::new(PACKAGE_MANIFEST)).unwrap()
  }

  #[test]
  fn finds_keyworded_dependencies_and_paths() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_package(
      &root.join("node_modules/zeta"),
      r#"{ "name": "zeta", "keywords": ["quilt-addon"] }"#,
    );
    write_package(
      &root.join("node_modules/alpha"),
      r#"{ "name": "alpha", "keywords": ["quilt-addon"] }"#,
    );
    write_package(&root.join("node_modules/plain"), r#"{ "name": "plain" }"#);
    write_package(&root.join("lib/local"), r#"{ "name": "local" }"#);

    let project = manifest(
      r#"{
        "name": "app",
        "dependencies": { "zeta": "1", "plain": "1", "missing": "1" },
        "devDependencies": { "alpha": "1" },
        "quilt-addon": { "paths": ["lib/local", "lib/absent"] }
      }"#,
    );

    let names: Vec<_> = discover_addons(root, &project)
      .unwrap()
      .into_iter()
      .map(|p| p.manifest.name)
      .collect();
    assert_eq!(names, vec!["alpha", "zeta", "local"]);
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_package(
      &root.join("node_modules/dup"),
      r#"{ "name": "dup", "keywords": ["quilt-addon"] }"#,
    );
    write_package(&root.join("lib/dup"), r#"{ "name": "dup" }"#);

    let project = manifest(
      r#"{ "name": "app", "dependencies": { "dup": "1" }, "quilt-addon": { "paths": ["lib/dup"] } }"#,
    );
    let err = discover_addons(root, &project).unwrap_err();
    assert!(matches!(err, ProjectError::DuplicateAddon { ref name, .. } if name == "dup"));
  }
}
