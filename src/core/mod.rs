//! Core primitives for fflt (no terminal dependencies beyond output styling).

mod commands;
mod config;
mod fuzzy;
mod package;
mod repo;

pub use commands::*;
pub use config::*;
pub use fuzzy::*;
pub use package::*;
pub use repo::*;
