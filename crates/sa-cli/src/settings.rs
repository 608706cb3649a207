use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sa_core::EngineConfig;

/// Config path from the flag, else `SA_CONFIG`.
pub fn config_path(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var("SA_CONFIG").ok().map(PathBuf::from))
}

/// Load and validate the engine configuration. No path means defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config: EngineConfig = toml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            tracing::info!(
                "loaded config {} ({} channels)",
                path.display(),
                config.channels.len()
            );
            config
        }
        None => EngineConfig::default(),
    };
    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

pub fn to_toml(config: &EngineConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize config")
}
