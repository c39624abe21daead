//! Album Links - adds streaming and catalog links to an album list.
//!
//! Each album is looked up on Spotify, Deezer, Discogs and MusicBrainz. A
//! provider that has no album hit falls back to a track and then an artist
//! search, and the best fuzzy match above threshold becomes that provider's
//! link.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("album_links=info".parse()?))
        .init();

    cli::run_command(&args)
}
