//! CLI command definitions and dispatch.

mod config;
mod enrich;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub use config::{cmd_config_init, cmd_config_show};
pub use enrich::{CredentialOverrides, cmd_enrich};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add Spotify, Deezer, Discogs and MusicBrainz links to an album list
    Enrich {
        /// JSON file holding an array of {"artist", "album"} records
        file: PathBuf,
        /// Write the result here instead of back into FILE
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Config file (defaults to the OS config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Spotify client id
        #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
        spotify_client_id: Option<String>,
        /// Spotify client secret
        #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
        spotify_client_secret: Option<String>,
        /// Discogs personal access token
        #[arg(long, env = "DISCOGS_API_TOKEN", hide_env_values = true)]
        discogs_token: Option<String>,
        /// Resolve links and print a summary without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a config file with default settings
    Init {
        /// Where to write it (defaults to the OS config directory)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration with secrets masked
    Show {
        /// Config file (defaults to the OS config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Enrich {
            file,
            output,
            config,
            spotify_client_id,
            spotify_client_secret,
            discogs_token,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            let overrides = CredentialOverrides {
                spotify_client_id: spotify_client_id.clone(),
                spotify_client_secret: spotify_client_secret.clone(),
                discogs_api_token: discogs_token.clone(),
            };
            cmd_enrich(
                &rt,
                file,
                output.as_deref(),
                config.as_deref(),
                overrides,
                *dry_run,
            )
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => cmd_config_init(path.as_deref(), *force),
            ConfigAction::Show { config } => cmd_config_show(config.as_deref()),
        },
    }
}
