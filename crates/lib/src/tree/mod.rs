//! Lazy composition trees.
//!
//! A [`Tree`] describes a filesystem subtree as a plan of stages (source
//! directories, merges, picks, preprocessing, linking). Composition builds
//! trees without forcing any I/O; an external engine materializes them.
//!
//! # Submodules
//!
//! - [`stages`] - The injected stage operators and the plan-recording implementation
//! - [`lua`] - `Tree` userdata and the `quilt.tree` helper table

pub mod lua;
pub mod stages;
mod types;

pub use stages::{PlanStages, StageResult, Stages};
pub use types::*;
