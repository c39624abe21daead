//! Config file commands.

use std::path::Path;

use crate::config::{self, Config, ConfigError};

const MASK: &str = "********";

/// Write a default config file
pub fn cmd_config_init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if path.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", path);
    }

    config::save_to(&Config::default(), &path)?;
    println!("Wrote default configuration to {:?}", path);
    Ok(())
}

/// Print the configuration the `enrich` command would use
pub fn cmd_config_show(path: Option<&Path>) -> anyhow::Result<()> {
    let config = match path {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };

    print!("{}", render_masked(&config)?);
    Ok(())
}

fn render_masked(config: &Config) -> anyhow::Result<String> {
    let mut shown = config.clone();
    let creds = &mut shown.credentials;
    for secret in [
        &mut creds.spotify_client_id,
        &mut creds.spotify_client_secret,
        &mut creds.discogs_api_token,
    ] {
        if secret.is_some() {
            *secret = Some(MASK.to_string());
        }
    }

    Ok(toml::to_string_pretty(&shown)?)
}
