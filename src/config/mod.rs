use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::Cli;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Upstream transcript sources
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Origin serving YouTube watch pages (caption catalog)
    pub watch_base_url: String,

    /// Transcript proxy queried as `<endpoint>?id=<video id>`
    pub alternative_endpoint: String,

    /// User-Agent sent on every outbound request
    pub user_agent: String,

    /// Retry `/api/transcript` against the alternative endpoint when captions can't be read
    pub fallback_to_alternative: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            watch_base_url: "https://www.youtube.com".to_string(),
            alternative_endpoint: "https://yt-transcript-api.vercel.app/api".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            fallback_to_alternative: true,
        }
    }
}

impl Config {
    /// Load configuration for the server, then apply command line / environment overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match Self::config_path(cli.config.as_deref())? {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        if let Some(addr) = cli.bind {
            config.server.bind_addr = addr;
        }
        if let Some(endpoint) = &cli.alt_endpoint {
            config.sources.alternative_endpoint = endpoint.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get configuration file path, if one exists
    fn config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Ok(Some(path.to_path_buf()));
        }

        // Current directory first for easy local runs
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(Some(local_config));
        }

        Ok(dirs::config_dir()
            .map(|dir| dir.join("yt-transcript-server").join("config.yaml"))
            .filter(|path| path.exists()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("sources.watch_base_url", &self.sources.watch_base_url)?;
        validate_http_url("sources.alternative_endpoint", &self.sources.alternative_endpoint)?;

        if self.sources.user_agent.trim().is_empty() {
            anyhow::bail!("sources.user_agent must not be empty");
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", field, value))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("{} must use HTTP or HTTPS protocol", field);
    }

    Ok(())
}
