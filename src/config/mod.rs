//! Configuration for `folio.toml`.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5000                 # HTTP port number
//! watch = true                # Close reload clients on file changes
//! reload_port = 35729         # WebSocket port for the reload channel
//!
//! [[folder]]
//! route = "/"
//! path = "public"
//! version = "v1.2.3"
//! include = ["app.js", "app.css"]
//! ```
//!
//! Each `[[folder]]` table declares one servable directory. The folder list
//! doubles as the watch list for the reload notifier; there is no implicit
//! process-wide registry of folders.

use std::{
    fs,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings
    pub serve: ServeConfig,

    /// Servable directories
    pub folder: Vec<FolderConfig>,
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Enable the file watcher that disconnects reload clients on change.
    pub watch: bool,

    /// Base port for the reload WebSocket channel.
    pub reload_port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5000,
            watch: true,
            reload_port: 35729,
        }
    }
}

/// One servable directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    /// URL route prefix this folder is mounted on.
    pub route: String,

    /// Directory path (relative to the config file).
    pub path: PathBuf,

    /// Version string stamped into markup and cache manifests.
    pub version: Option<String>,

    /// Include files inlined into markup documents in production mode.
    pub include: Vec<String>,

    /// Serve this file for every request on the route instead of deriving
    /// the name from the request path.
    pub file: Option<String>,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            route: "/".to_string(),
            path: PathBuf::new(),
            version: None,
            include: Vec::new(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Folder paths are resolved relative to the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!(
                "config file '{}' not found; create a folio.toml with at least one [[folder]]",
                path.display()
            );
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        for folder in &mut config.folder {
            if folder.path.is_relative() {
                folder.path = root.join(&folder.path);
            }
        }

        if config.folder.is_empty() {
            bail!("no [[folder]] tables in {}", path.display());
        }

        Ok(config)
    }
}

#[cfg(test)]
pub fn test_parse_config(raw: &str) -> Config {
    toml::from_str(raw).expect("test config should parse")
}
