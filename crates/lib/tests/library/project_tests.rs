//! Project loading, ordering and config aggregation.

use std::fs;

use quilt_lib::project::{Project, ProjectError};
use quilt_lib::resolver::ResolveError;
use serde_json::json;

use super::common::{ProjectFixture, project_manifest};

fn addon_names(project: &Project) -> Vec<&str> {
  project.addons().iter().map(|a| a.name()).collect()
}

#[test]
fn loads_addons_in_declared_order() {
  let project = ProjectFixture::new(project_manifest(&["alpha", "beta", "gamma"], json!({})));
  project
    .addon("alpha", json!({ "after": ["gamma"] }))
    .file("index.lua", r#"return { name = "alpha" }"#);
  project
    .addon("beta", json!({}))
    .file("index.lua", r#"return { name = "beta" }"#);
  project
    .addon("gamma", json!({}))
    .file("index.lua", r#"return { name = "gamma" }"#);

  let loaded = Project::load(project.root()).unwrap();
  assert_eq!(addon_names(&loaded), vec!["beta", "gamma", "alpha"]);
  assert!(loaded.addons().iter().all(|a| a.app().is_ok()));
}

#[test]
fn same_named_helpers_stay_with_their_package() {
  let project = ProjectFixture::new(project_manifest(&["a", "b"], json!({})));
  for name in ["a", "b"] {
    project
      .addon(name, json!({}))
      .file("index.lua", "local h = require('helpers') return { name = h.name }")
      .file("helpers.lua", &format!(r#"return {{ name = "{}-addon" }}"#, name));
  }

  let loaded = Project::load(project.root()).unwrap();
  assert_eq!(addon_names(&loaded), vec!["a-addon", "b-addon"]);
  assert_eq!(loaded.addons()[1].module_name(), "b-addon");
}

#[test]
fn helpers_of_earlier_packages_are_not_visible() {
  let project = ProjectFixture::new(project_manifest(&["a", "b"], json!({})));
  project
    .addon("a", json!({}))
    .file("index.lua", "local h = require('helpers') return { name = h.name }")
    .file("helpers.lua", r#"return { name = "a-addon" }"#);
  project
    .addon("b", json!({}))
    .file("index.lua", "local h = require('helpers') return { name = h.name }");

  let err = Project::load(project.root()).err().unwrap();
  assert!(err.to_string().contains("helpers"), "{}", err);
}

#[test]
fn ordering_cycle_fails_load() {
  let project = ProjectFixture::new(project_manifest(&["a", "b"], json!({})));
  project.addon("a", json!({ "before": ["b"] }));
  project.addon("b", json!({ "before": ["a"] }));

  let err = Project::load(project.root()).err().unwrap();
  assert!(matches!(err, ProjectError::AddonCycle(_)), "{}", err);
}

#[test]
fn manifest_only_packages_are_generated_addons() {
  let project = ProjectFixture::new(project_manifest(&["bare"], json!({})));
  project.addon("bare", json!({}));

  let loaded = Project::load(project.root()).unwrap();
  assert_eq!(addon_names(&loaded), vec!["(generated bare addon)"]);
}

#[test]
fn entry_point_follows_manifest() {
  let project = ProjectFixture::new(project_manifest(&["custom"], json!({})));
  project
    .addon("custom", json!({ "main": "lib/definition" }))
    .file("lib/definition.lua", r#"return function(ctx) return { name = "custom-entry" } end"#);

  let loaded = Project::load(project.root()).unwrap();
  let addon = &loaded.addons()[0];
  assert_eq!(addon.name(), "custom-entry");
  assert!(addon.root().ends_with("node_modules/custom/lib"));
}

#[test]
fn in_repo_addons_are_discovered() {
  let project = ProjectFixture::new(json!({
    "name": "host-app",
    "quilt-addon": { "paths": ["lib/local-addon"] },
  }));
  project.write("lib/local-addon/package.json", r#"{ "name": "local-addon" }"#);
  project.write("lib/local-addon/index.lua", r#"return { name = "local" }"#);

  let loaded = Project::load(project.root()).unwrap();
  assert_eq!(addon_names(&loaded), vec!["local"]);
}

#[test]
fn invalid_definition_fails_load() {
  let project = ProjectFixture::new(project_manifest(&["broken"], json!({})));
  project.addon("broken", json!({})).file("index.lua", "return true");

  let err = Project::load(project.root()).err().unwrap();
  assert!(matches!(
    err,
    ProjectError::Resolve(ResolveError::InvalidDefinition { .. })
  ));
}

#[test]
fn invalid_options_fail_load() {
  let project = ProjectFixture::new(json!({ "name": "host-app", "quilt": { "lint": "always" } }));
  let err = Project::load(project.root()).err().unwrap();
  assert!(matches!(err, ProjectError::Options { .. }));
}

#[test]
fn app_settings_come_from_options() {
  let project = ProjectFixture::new(json!({
    "name": "host-app",
    "quilt": { "name": "Renamed", "lint": false, "lint_rules": "config/lint.json" },
  }));
  let loaded = Project::load(project.root()).unwrap();
  assert_eq!(loaded.app().name, "Renamed");
  assert!(!loaded.app().lint.enabled);
  assert!(loaded.app().lint.rules_path.ends_with("config/lint.json"));
}

#[test]
fn addon_configs_merge_under_base() {
  let project = ProjectFixture::new(project_manifest(&["one", "two"], json!({})));
  project
    .addon("one", json!({}))
    .file("index.lua", r#"return { name = "one" }"#)
    .file(
      "config/environment.lua",
      r#"
        return function(env, base)
          return { env = env, shared = { from = "one", one = true }, title = "one" }
        end
      "#,
    );
  project
    .addon("two", json!({}))
    .file("index.lua", r#"return { name = "two" }"#)
    .file(
      "config/environment.lua",
      r#"return function(env, base) return { shared = { from = "two" } } end"#,
    );

  let loaded = Project::load(project.root()).unwrap();
  let config = loaded
    .addons_config("production", &json!({ "title": "app" }))
    .unwrap();

  assert_eq!(
    config,
    json!({
      "env": "production",
      "shared": { "from": "two", "one": true },
      "title": "app",
    })
  );
}

#[test]
fn config_errors_propagate() {
  let project = ProjectFixture::new(project_manifest(&["faulty"], json!({})));
  project
    .addon("faulty", json!({}))
    .file("index.lua", r#"return { name = "faulty" }"#)
    .file("config/environment.lua", "return function() error('no config for you') end");

  let loaded = Project::load(project.root()).unwrap();
  let err = loaded.addons_config("test", &json!({})).unwrap_err();
  assert!(err.to_string().contains("no config for you"));
}

#[test]
fn missing_project_manifest_is_an_error() {
  let dir = tempfile::TempDir::new().unwrap();
  fs::create_dir_all(dir.path().join("node_modules")).unwrap();
  assert!(matches!(
    Project::load(dir.path()).err().unwrap(),
    ProjectError::Manifest(_)
  ));
}
