//! Stats feed configuration.

use crate::types::HostServices;
use serde::{Deserialize, Serialize};

/// Default feed host when none is configured
fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Default feed port, the host's stock game port
fn default_port() -> u16 {
    27960
}

/// Connection settings for the stats ingestion listener, read once at
/// listener construction.
///
/// Deserializable from a config file, or derived from host cvars with
/// [`StatsSettings::from_host`]. A disabled feed makes the listener mark
/// itself done without connecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSettings {
    /// Whether the feed is administratively enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Feed host; defaults to loopback.
    #[serde(default = "default_host")]
    pub host: String,
    /// Feed port; defaults to the game port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional shared-secret credential sent on subscribe.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
            password: None,
        }
    }
}

impl StatsSettings {
    /// Reads the settings from host cvars: `stats_enable`, `stats_host`,
    /// `stats_port` (falling back to `net_port`), `stats_password`.
    pub fn from_host(host: &dyn HostServices) -> Self {
        let enabled = host
            .cvar("stats_enable")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|v| v != 0)
            .unwrap_or(false);
        let feed_host = host
            .cvar("stats_host")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_host);
        let port = host
            .cvar("stats_port")
            .and_then(|v| v.trim().parse().ok())
            .or_else(|| host.cvar("net_port").and_then(|v| v.trim().parse().ok()))
            .unwrap_or_else(default_port);
        let password = host.cvar("stats_password").filter(|v| !v.is_empty());
        Self {
            enabled,
            host: feed_host,
            port,
            password,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
