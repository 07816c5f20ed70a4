//! Data sources: synthetic property samples and the optional model registry.

pub mod registry;
pub mod sample;

pub use registry::*;
pub use sample::*;
