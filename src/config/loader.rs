use std::{fs, fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use config::{Config, Environment};
use log::{info, trace};

use super::defaults::{CLIENT_SECTION, ClientConfig};

pub fn get_default_config() -> &'static str {
    include_str!("../../config/config.toml")
}

/// Loads the configuration file at `path`, creating it from the embedded
/// default first if it does not exist. Environment variables prefixed with
/// `JM_` override file values (`JM_CLIENT__BASE_URL=...`).
pub fn load_configuration(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sources = get_default_config();
        write_config_to(path, sources).context("Could not create default config")?;
        info!(path:% = path.display(); "Created new configuration file");
    }

    let filename = path.to_str().context("Invalid config file path")?;

    Config::builder()
        .add_source(config::File::with_name(filename))
        .add_source(Environment::with_prefix("JM").prefix_separator("_").separator("__"))
        .build()
        .context("Could not build config")
}

/// Extracts the `[client]` section. Missing keys take their default values;
/// a missing section yields [`ClientConfig::default`].
pub fn client_config(cfg: &Config) -> Result<ClientConfig> {
    match cfg.get::<ClientConfig>(CLIENT_SECTION) {
        Ok(client) => {
            trace!(base_url = &*client.base_url; "Loaded client configuration");
            Ok(client)
        },
        Err(config::ConfigError::NotFound(_)) => Ok(ClientConfig::default()),
        Err(e) => Err(e).context("Could not read client configuration"),
    }
}

pub fn load_client_config(path: &Path) -> Result<ClientConfig> {
    let cfg = load_configuration(path)?;
    client_config(&cfg)
}

pub fn write_config_to(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create parent directories")?;
    };

    let mut file = File::create(path).context("Failed to create config file")?;
    file.write_all(source.as_bytes())
        .context("Failed to write config content")?;
    file.write_all(b"\n").context("Failed to write newline")?;
    Ok(())
}
