use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use notetree_core::{Error, get_default_config_path};

/// Process configuration for the API server.
///
/// The notes directory itself is not configured here; it lives in the
/// settings file pointed to by `--config`.
#[derive(Debug, Clone, Parser)]
#[command(name = "notetree", version, about = "Serve the note tree over a local HTTP API")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "NOTETREE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind
    #[arg(long, env = "NOTETREE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, env = "NOTETREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory with the built UI, served for non-API paths
    #[arg(long, env = "NOTETREE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "NOTETREE_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn settings_path(&self) -> Result<PathBuf, Error> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => get_default_config_path(cfg!(debug_assertions)).ok_or(Error::NoDefaultPath),
        }
    }
}
