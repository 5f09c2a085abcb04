//! chartdex command-line front end
//!
//! Configuration loading and the `pack` helper live here so they can be
//! tested; `main.rs` wires them to the scanner and catalog.

pub mod config;
pub mod pack;

pub use config::{AppConfig, ConfigError};
pub use pack::pack_folder;
