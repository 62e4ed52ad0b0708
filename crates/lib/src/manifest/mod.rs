//! Package manifest types.
//!
//! Addons ship as packages described by a `package.json`. This module parses
//! the fields composition consumes and locates packages on disk.

mod types;

pub use types::*;
