use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::resolver::DEFAULT_SERVICE_URL;

pub const CONFIG_FILE_NAME: &str = "skyfacet.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSettings {
    /// Base URL of the identity service handles are resolved against
    pub service_url: String,
    /// Per-request transport timeout
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub resolver: ResolverSettings,
}

impl Settings {
    /// Load settings from defaults, an optional `skyfacet.toml` in the current
    /// directory, then environment variables (highest priority)
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        let current_dir_path = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        if let Ok(url) = std::env::var("SKYFACET_SERVICE_URL") {
            builder = builder.set_override("resolver.service_url", url)?;
        }
        if let Ok(timeout) = std::env::var("SKYFACET_TIMEOUT_SECS") {
            builder = builder.set_override("resolver.timeout_secs", timeout)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load settings from defaults overlaid with a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path.as_ref()).required(true))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("resolver.service_url", DEFAULT_SERVICE_URL)?
            .set_default("resolver.timeout_secs", 30)?
            .set_default(
                "resolver.user_agent",
                concat!("skyfacet/", env!("CARGO_PKG_VERSION")),
            )
    }
}
