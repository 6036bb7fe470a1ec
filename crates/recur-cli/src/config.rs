//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$RECUR_CONFIG` environment variable
//! 2. `~/.config/recur/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub web: WebConfig,
    pub catalog: CatalogConfig,
    pub mcp: McpConfig,
}

/// Database storage settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. Default: platform-specific data dir.
    pub path: Option<String>,
}

/// HTTP API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
}

/// Algorithm catalog settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Insert the builtin algorithms when the catalog is empty.
    pub seed_on_start: bool,
}

/// MCP server settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Custom system instructions appended to MCP server info.
    pub instructions: Option<String>,
}

// --- Defaults ---

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            allowed_origins: vec!["http://localhost:5173".into()],
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_on_start: true,
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("RECUR_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/recur/config.toml
    if let Some(home) = dirs_home() {
        let p = home.join(".config").join("recur").join("config.toml");
        return Some(p);
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `recur config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
