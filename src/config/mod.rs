//! Configuration management for `sprig.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                      |
//! |------------|----------------------------------------------|
//! | `[serve]`  | HTTP server (interface, port)                |
//! | `[render]` | Render mode (development, production)        |
//!
//! The file is optional: a missing `sprig.toml` yields defaults. CLI
//! arguments override file values. The loaded config is stored in a global
//! `ArcSwap` handle for lock-free reads from request handlers.

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use crate::cli::{Cli, Commands};
use crate::core::BuildMode;

/// Root configuration structure representing sprig.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// HTTP server settings
    pub serve: ServeConfig,

    /// Render settings
    pub render: RenderConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
        }
    }
}

/// Render settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Error presentation mode. Development surfaces diagnostics;
    /// production shows an opaque failure page.
    pub mode: BuildMode,
}

impl Config {
    /// Load configuration from the CLI-specified file, falling back to
    /// defaults when the file does not exist, then apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.exists() {
            let content = std::fs::read_to_string(&cli.config)
                .with_context(|| format!("failed to read {}", cli.config.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", cli.config.display()))?
        } else {
            Self::default()
        };

        config.config_path = cli.config.clone();
        config.apply_cli(cli);
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        let Commands::Serve {
            interface,
            port,
            production,
        } = &cli.command;

        if let Some(interface) = interface {
            self.serve.interface = *interface;
        }
        if let Some(port) = port {
            self.serve.port = *port;
        }
        if *production {
            self.render.mode = BuildMode::Production;
        }
    }
}

// ============================================================================
// Global handle
// ============================================================================

/// Global config storage.
static CONFIG: LazyLock<ArcSwap<Config>> =
    LazyLock::new(|| ArcSwap::from_pointee(Config::default()));

#[inline]
pub fn cfg() -> Arc<Config> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: Config) -> Arc<Config> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
