//! Command-line argument parsing.
//!
//! Uses clap to parse CLI arguments. Host and port also read from the
//! environment so container deployments need no flags.

use crate::config::{Config, ServerConfig};
use clap::Parser;
use std::path::PathBuf;

/// HTTP backend for the battle game administration tool.
#[derive(Parser, Debug)]
#[command(name = "battle-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(short = 'H', long, value_name = "HOST", env = "BATTLE_ADMIN_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short = 'p', long, value_name = "PORT", env = "BATTLE_ADMIN_PORT")]
    pub port: Option<u16>,

    /// Path prefix for the endpoints (use "/" to serve at the root)
    #[arg(long, value_name = "PREFIX")]
    pub route_prefix: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, using the default if not specified.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies CLI overrides on top of the loaded server config.
    pub fn apply_overrides(&self, server: &mut ServerConfig) {
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(prefix) = &self.route_prefix {
            server.route_prefix = prefix.clone();
        }
    }
}
