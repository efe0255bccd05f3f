//! CLI command implementations.

pub mod common;
pub mod cones;
pub mod reduce;
pub mod version;
