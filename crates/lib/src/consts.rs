//! Shared constants.

/// Length of the truncated hash used for [`ObjectHash`](crate::util::hash::ObjectHash).
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Environment variable that switches addons into development mode.
pub const ADDON_ENV_VAR: &str = "QUILT_ADDON_ENV";

/// Value of [`ADDON_ENV_VAR`] that enables development mode.
pub const ADDON_ENV_DEVELOPMENT: &str = "development";

/// Package manifest file name.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Keyword marking a package as an addon.
pub const ADDON_KEYWORD: &str = "quilt-addon";

/// Default addon entry point, relative to the package directory.
pub const DEFAULT_ADDON_MAIN: &str = "index.lua";

/// Extension appended to entry points declared without one.
pub const ADDON_MAIN_EXT: &str = "lua";

/// Directory holding installed packages, relative to the project root.
pub const PACKAGES_DIR: &str = "node_modules";

/// Addon config module, relative to the addon root.
pub const CONFIG_MODULE: &str = "config/environment.lua";

/// Blueprint directory, relative to the addon root.
pub const BLUEPRINTS_DIR: &str = "blueprints";

/// Export list recorded for every discovered module.
pub const DEFAULT_EXPORT: &str = "default";

/// Conventional output file of the CSS preprocessor.
pub const STYLES_OUTPUT: &str = "addon.css";

/// Claimant recorded for modules seeded into the whitelist by the app.
pub const APP_CLAIMANT: &str = "(app)";
