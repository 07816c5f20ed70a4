//! `homecast` library crate.
//!
//! The binary (`hcast`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future web front-end, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod encode;
pub mod error;
pub mod feature;
pub mod io;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
