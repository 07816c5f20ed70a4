//! Input/output helpers.
//!
//! - model artifact JSON read/write (`artifact`)
//! - property CSV ingest + validation (`ingest`)
//! - result exports (CSV) (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;
