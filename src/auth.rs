//! Provider credential lookup

use std::fs;

use anyhow::{Context, Result, bail};

use crate::config::ConfigFile;

pub const ENV_API_KEY: &str = "YT_FEED_API_KEY";

/// Find the API key: `api_key`, then the file at `api_key_path`, then `YT_FEED_API_KEY`.
pub fn resolve_api_key(config: &ConfigFile) -> Result<String> {
    resolve_with_env(config, std::env::var(ENV_API_KEY).ok())
}

fn resolve_with_env(config: &ConfigFile, env_key: Option<String>) -> Result<String> {
    if let Some(key) = config.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        tracing::debug!("Using API key from config");
        return Ok(key.to_string());
    }

    if let Some(path) = config.api_key_path.as_ref().filter(|p| p.exists()) {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("api key not found in '{}'", path.display()))?;
        let key = contents.trim();
        if key.is_empty() {
            bail!("no api key in '{}'", path.display());
        }
        tracing::debug!(path = %path.display(), "Using API key from file");
        return Ok(key.to_string());
    }

    match env_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::debug!("Using API key from {ENV_API_KEY}");
            Ok(key)
        }
        None => bail!("api key was not found either in the config or in {ENV_API_KEY}"),
    }
}
