//! Command-line parsing and validation helpers.


use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::net::{SocketAddr, ToSocketAddrs};

/// Default interface the bridge binds; commands can mutate host state, so we
/// never listen beyond loopback unless told to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default TCP port for the command bridge.
pub const DEFAULT_PORT: u16 = 9876;

/// CLI options for the scenebridge daemon.
#[derive(Debug, Parser, Clone)]
#[command(about = "Scenebridge TCP command server", author, version)]
pub struct AppConfig {
    /// Interface the bridge listens on
    #[arg(long, env = "SCENEBRIDGE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port the bridge listens on
    #[arg(long, env = "SCENEBRIDGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SCENEBRIDGE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SCENEBRIDGE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Enable verbose dispatch timing logs
    #[arg(long)]
    pub log_timings: bool,
}

impl AppConfig {
    /// Resolve `host:port` into a concrete socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let spec = format!("{}:{}", self.host, self.port);
        spec.to_socket_addrs()
            .with_context(|| format!("invalid bind address '{spec}'"))?
            .next()
            .ok_or_else(|| anyhow!("bind address '{spec}' resolved to nothing"))
    }
}
