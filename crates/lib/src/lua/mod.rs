//! Lua runtime for addon definitions.
//!
//! Addon entry points, config modules and tree hooks are Lua. This module
//! creates the VM, installs file loaders and registers the `quilt` global.
//!
//! # Submodules
//!
//! - [`globals`] - The `quilt` global table
//! - [`loaders`] - File loading with `__dir` injection
//! - [`runtime`] - VM creation

pub mod globals;
pub mod loaders;
pub mod runtime;
