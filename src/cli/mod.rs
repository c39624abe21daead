//! Command-line interface for album-links.
//!
//! `enrich` reads a JSON album list, resolves links on every provider and
//! writes the list back. `config` manages the TOML settings file.

mod commands;

pub use commands::{Cli, Commands, run_command};
