//! Opaque prediction collaborators (pre-trained model artifacts).

pub mod model;

pub use model::*;
