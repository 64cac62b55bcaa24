//! Service configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{name} must be {expected}, got {value:?}")]
  Invalid {
    name: &'static str,
    expected: &'static str,
    value: String,
  },
}

/// Runtime settings for the catalog API.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
  /// PORT (default 5005).
  pub port: u16,
  /// BIND_ADDR (default 127.0.0.1).
  pub bind_addr: IpAddr,
  /// DATABASE_URL; static mode when unset.
  pub database_url: Option<String>,
  /// CATALOG_PATH; dataset file used instead of the bundled one.
  pub catalog_path: Option<PathBuf>,
  /// RELATED_CACHE_CAPACITY (default 512). 0 disables the cache.
  pub cache_capacity: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      port: 5005,
      bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
      database_url: None,
      catalog_path: None,
      cache_capacity: 512,
    }
  }
}

impl ServerConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build from any variable source; blank values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let defaults = Self::default();

    let port = match get("PORT") {
      Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "PORT",
        expected: "a valid u16",
        value: v,
      })?,
      None => defaults.port,
    };

    let bind_addr = match get("BIND_ADDR") {
      Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "BIND_ADDR",
        expected: "an IP address",
        value: v,
      })?,
      None => defaults.bind_addr,
    };

    let cache_capacity = match get("RELATED_CACHE_CAPACITY") {
      Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "RELATED_CACHE_CAPACITY",
        expected: "a non-negative integer",
        value: v,
      })?,
      None => defaults.cache_capacity,
    };

    Ok(Self {
      port,
      bind_addr,
      database_url: get("DATABASE_URL"),
      catalog_path: get("CATALOG_PATH").map(PathBuf::from),
      cache_capacity,
    })
  }

  pub fn socket_addr(&self) -> SocketAddr {
    SocketAddr::new(self.bind_addr, self.port)
  }
}
