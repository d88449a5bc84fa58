//! Daemon configuration
//!
//! Loaded from an optional TOML file; every field has a default so the
//! daemon runs with no config at all.
//!
//! ```toml
//! bind = "0.0.0.0:5683"
//! node_port = 5683
//!
//! [database]
//! url = "sqlite://iotgw.db?mode=rwc"
//! max_connections = 8
//! acquire_timeout_secs = 5
//! ```

use std::net::SocketAddr;
use std::path::Path;

use iotgw_store::DbConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address the gateway API listens on
    pub bind: SocketAddr,
    /// Well-known port every node serves its resource endpoints on
    pub node_port: u16,
    /// Connection pool settings
    pub database: DbConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5683".parse().expect("valid default bind address"),
            node_port: 5683,
            database: DbConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path))?;
                Ok(toml::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = GatewayConfig::load(None).unwrap();
        assert_eq!(config.node_port, 5683);
        assert_eq!(config.database.max_connections, 8);
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let config: GatewayConfig = toml::from_str(
            r#"
            bind = "127.0.0.1:9000"

            [database]
            url = "sqlite:///tmp/test.db?mode=rwc"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.database.url, "sqlite:///tmp/test.db?mode=rwc");
        assert_eq!(config.database.acquire_timeout_secs, 5);
    }
}
