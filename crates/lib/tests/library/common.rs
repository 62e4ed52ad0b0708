//! On-disk project fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

pub struct ProjectFixture {
  dir: TempDir,
}

impl ProjectFixture {
  /// A project whose `package.json` is `manifest`.
  pub fn new(manifest: Value) -> Self {
    let fixture = Self {
      dir: TempDir::new().unwrap(),
    };
    fixture.write("package.json", &manifest.to_string());
    fixture
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  pub fn write(&self, relative: &str, content: &str) -> PathBuf {
    let path = self.dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
  }

  /// Install an addon package under `node_modules/<name>` with `addon_section`
  /// as its `quilt-addon` field.
  pub fn addon(&self, name: &str, addon_section: Value) -> AddonFixture<'_> {
    let base = format!("node_modules/{}", name);
    let manifest = json!({
      "name": name,
      "keywords": ["quilt-addon"],
      "quilt-addon": addon_section,
    });
    self.write(&format!("{}/package.json", base), &manifest.to_string());
    AddonFixture { project: self, base }
  }
}

pub struct AddonFixture<'a> {
  project: &'a ProjectFixture,
  base: String,
}

impl AddonFixture<'_> {
  pub fn file(self, relative: &str, content: &str) -> Self {
    self.project.write(&format!("{}/{}", self.base, relative), content);
    self
  }
}

/// A project manifest depending on `addons`, with `quilt` options.
pub fn project_manifest(addons: &[&str], quilt: Value) -> Value {
  let dependencies: serde_json::Map<String, Value> = addons
    .iter()
    .map(|name| (name.to_string(), Value::String("*".to_string())))
    .collect();
  json!({
    "name": "host-app",
    "dependencies": dependencies,
    "quilt": quilt,
  })
}
