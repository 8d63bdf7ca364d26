use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{
    Cli, Command, DEFAULT_BIND, DEFAULT_CONCURRENCY, DEFAULT_LIMIT, DEFAULT_MAX_KEYWORDS,
    DEFAULT_OUTPUT, DEFAULT_PORT, DEFAULT_SITE_ORIGIN, DEFAULT_TIMEOUT_SECS, DEFAULT_WINDOW_MS,
};

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Site origin that every fetched page must belong to
    pub site_origin: Option<String>,

    /// Maximum number of keywords and phrases to rank
    pub max_keywords: Option<usize>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Output format: text or json
    pub output: Option<String>,

    /// Save report to file
    pub save: Option<String>,

    /// Verbose output
    pub verbose: Option<bool>,

    /// Number of concurrent requests during an audit
    pub concurrency: Option<usize>,

    /// Outbound requests per second during an audit
    pub rate_limit: Option<f64>,

    /// Address the HTTP API binds to
    pub bind: Option<String>,

    /// Port the HTTP API listens on
    pub port: Option<u16>,

    /// Requests accepted per client and route in each window
    pub limit: Option<u32>,

    /// Rate-limit window length in milliseconds
    pub window_ms: Option<u64>,

    /// Take the client address from forwarding headers
    pub trust_proxy: Option<bool>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "Loading configuration file");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Get the default configuration file paths to check (in order of priority)
    /// Returns paths in order: current directory, user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("studiolens.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .and_then(|p| {
                if p.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(p))
                }
            })
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let app_config_dir = config_home.join("studiolens");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(app_config_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Try to load configuration from default paths
    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Merge this configuration with CLI arguments
    /// CLI arguments take precedence over config file values
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        let command = match &cli.command {
            Command::Audit {
                targets,
                concurrency,
                rate_limit,
            } => Command::Audit {
                targets: targets.clone(),
                concurrency: if *concurrency != DEFAULT_CONCURRENCY {
                    *concurrency
                } else {
                    self.concurrency.unwrap_or(*concurrency)
                },
                rate_limit: rate_limit.or(self.rate_limit),
            },
            Command::Serve {
                bind,
                port,
                limit,
                window_ms,
                trust_proxy,
            } => Command::Serve {
                bind: if bind != DEFAULT_BIND {
                    bind.clone()
                } else {
                    self.bind.clone().unwrap_or_else(|| bind.clone())
                },
                port: if *port != DEFAULT_PORT {
                    *port
                } else {
                    self.port.unwrap_or(*port)
                },
                limit: if *limit != DEFAULT_LIMIT {
                    *limit
                } else {
                    self.limit.unwrap_or(*limit)
                },
                window_ms: if *window_ms != DEFAULT_WINDOW_MS {
                    *window_ms
                } else {
                    self.window_ms.unwrap_or(*window_ms)
                },
                trust_proxy: *trust_proxy || self.trust_proxy.unwrap_or(false),
            },
            other => other.clone(),
        };

        Cli {
            command,
            site_origin: if cli.site_origin != DEFAULT_SITE_ORIGIN {
                cli.site_origin.clone()
            } else {
                self.site_origin
                    .clone()
                    .unwrap_or_else(|| cli.site_origin.clone())
            },
            max_keywords: if cli.max_keywords != DEFAULT_MAX_KEYWORDS {
                cli.max_keywords
            } else {
                self.max_keywords.unwrap_or(cli.max_keywords)
            },
            timeout: if cli.timeout != DEFAULT_TIMEOUT_SECS {
                cli.timeout
            } else {
                self.timeout.unwrap_or(cli.timeout)
            },
            output: if cli.output != DEFAULT_OUTPUT {
                cli.output.clone()
            } else {
                self.output.clone().unwrap_or_else(|| cli.output.clone())
            },
            save: cli.save.clone().or_else(|| self.save.clone()),
            verbose: if cli.verbose {
                cli.verbose
            } else {
                self.verbose.unwrap_or(cli.verbose)
            },
            config: cli.config.clone(),
        }
    }
}
