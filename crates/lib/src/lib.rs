//! quilt-lib: addon composition for the quilt build pipeline.
//!
//! This crate locates independently packaged addons, composes each addon's
//! content trees per category, and registers the JS modules they contribute
//! without naming collisions:
//! - `Addon`: one addon's identity, tree layout, hooks and memoized modules
//! - `TreeComposer`: per-category tree assembly and module bundling
//! - `ModuleWhitelist`: module names claimed during a sequential pass
//! - `resolver`: entry point resolution and addon definition lookup
//! - `Project`: discovery, ordering and the full composition pass

pub mod addon;
pub mod app;
pub mod config;
pub mod consts;
pub mod lua;
pub mod manifest;
pub mod project;
pub mod registry;
pub mod resolver;
pub mod tree;
pub mod util;
pub mod whitelist;
