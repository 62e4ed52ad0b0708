//! Full composition passes over on-disk projects.

use quilt_lib::addon::Category;
use quilt_lib::project::Project;
use quilt_lib::tree::{BundleOptions, Tree};
use serde_json::json;

use super::common::{ProjectFixture, project_manifest};

fn bundle_options(tree: &Tree) -> Option<&BundleOptions> {
  match tree {
    Tree::Bundle { options, .. } => Some(options),
    Tree::Merge { inputs } => inputs.iter().find_map(bundle_options),
    _ => None,
  }
}

#[test]
fn earlier_addon_claims_shared_module() {
  let project = ProjectFixture::new(project_manifest(&["first", "second"], json!({})));
  project
    .addon("first", json!({}))
    .file("index.lua", r#"return { name = "first", module_prefix = "shared" }"#)
    .file("addon/index.js", "");
  project
    .addon("second", json!({ "after": ["first"] }))
    .file("index.lua", r#"return { name = "second", module_prefix = "shared" }"#)
    .file("addon/index.js", "")
    .file("addon/util.js", "");

  let plan = Project::load(project.root()).unwrap().compose().unwrap();

  assert_eq!(plan.whitelist.claimant("shared"), Some("first"));
  assert_eq!(plan.whitelist.claimant("shared/index"), Some("first"));
  assert_eq!(plan.whitelist.claimant("shared/util"), Some("second"));

  let addon_plan = plan.category(Category::Addon).unwrap();
  let second = addon_plan.addons.iter().find(|a| a.addon == "second").unwrap();
  let options = bundle_options(&second.tree).unwrap();
  assert!(options.ignored_modules.contains("shared"));
  assert!(options.ignored_modules.contains("shared/index"));
}

#[test]
fn plan_covers_every_public_category() {
  let project = ProjectFixture::new(project_manifest(&["widgets"], json!({ "whitelist": ["jquery"] })));
  project
    .addon("widgets", json!({}))
    .file("addon/index.js", "")
    .file("app/components/widget.js", "")
    .file("vendor/widgets.css", "")
    .file("public/logo.svg", "");

  let plan = Project::load(project.root()).unwrap().compose().unwrap();

  let keys: Vec<_> = plan.categories.keys().map(|c| c.as_str()).collect();
  assert_eq!(
    keys,
    vec!["app", "styles", "templates", "addon", "vendor", "test-support", "public"]
  );
  for category in [Category::App, Category::Addon, Category::Vendor, Category::Public] {
    assert_eq!(plan.category(category).unwrap().addons.len(), 1, "{}", category);
  }
  assert!(plan.category(Category::Styles).unwrap().addons.is_empty());
  assert!(plan.category(Category::Styles).unwrap().merged.is_empty());

  assert_eq!(plan.whitelist.claimant("jquery"), Some("(app)"));
  assert_eq!(
    plan.whitelist.claimant("(generated widgets addon)/index"),
    None,
    "claims use the module name, not the addon name"
  );
  assert!(plan.whitelist.contains("(generated-widgets-addon)/index"));
}

#[test]
fn plan_serializes_with_category_names_and_hashes() {
  let project = ProjectFixture::new(project_manifest(&["styled"], json!({})));
  project
    .addon("styled", json!({}))
    .file("index.lua", r#"return { name = "styled" }"#)
    .file("addon/styles/addon.css", "");

  let plan = Project::load(project.root()).unwrap().compose().unwrap();
  let value = serde_json::to_value(&plan).unwrap();

  let addon = &value["categories"]["addon"];
  assert_eq!(addon["addons"][0]["addon"], "styled");
  assert_eq!(addon["addons"][0]["hash"].as_str().unwrap().len(), 20);
  assert_eq!(addon["merged"]["op"], "merge");
}

#[test]
fn project_extensions_widen_module_scan() {
  let project = ProjectFixture::new(project_manifest(
    &["typed"],
    json!({ "extensions": { "js": ["ts"] } }),
  ));
  project
    .addon("typed", json!({}))
    .file("index.lua", r#"return { name = "typed" }"#)
    .file("addon/index.ts", "");

  let loaded = Project::load(project.root()).unwrap();
  let modules = loaded.addons()[0].included_modules().unwrap();
  assert!(modules.contains_key("typed"));
  assert!(modules.contains_key("typed/index"));
  assert_eq!(loaded.addons()[0].js_file_glob(), "**/*.+(js|ts)");
}

#[test]
fn lua_hooks_run_during_compose() {
  let project = ProjectFixture::new(project_manifest(&["hooked"], json!({})));
  project
    .addon("hooked", json!({}))
    .file(
      "index.lua",
      r#"
        return {
          name = "hooked",
          tree_for = {
            vendor = function(tree)
              return quilt.tree.pick(tree, { dest_dir = "hooked" })
            end,
            public = function(tree) return nil end,
          },
        }
      "#,
    )
    .file("vendor/a.js", "")
    .file("public/b.txt", "");

  let plan = Project::load(project.root()).unwrap().compose().unwrap();

  let vendor = &plan.category(Category::Vendor).unwrap().addons[0].tree;
  let Tree::Merge { inputs } = vendor else {
    panic!("expected merge, got {:?}", vendor);
  };
  assert_eq!(inputs[0].op(), "pick");
  assert!(plan.category(Category::Public).unwrap().addons.is_empty());
}
