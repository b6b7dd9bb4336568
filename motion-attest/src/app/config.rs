//! Configuration Management

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::thresholds::Thresholds;

/// Hex length of an HMAC-SHA256 signature, the upper bound for session ids
const SIGNATURE_HEX_LEN: usize = 64;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Session registry settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Classifier thresholds
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Name of the environment variable holding the signing secret
    pub secret_env: String,
    /// Allow cross-origin calls from any origin
    pub permissive_cors: bool,
}

/// Session registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of an issued session (seconds)
    pub ttl_secs: u64,
    /// Characters of the signature used as the session id
    pub session_id_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            secret_env: "MOTION_ATTEST_SECRET".to_string(),
            permissive_cors: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            session_id_len: 16,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(crate::Error::Config(format!(
                "bind_addr must be a socket address, got {:?}", self.server.bind_addr
            )));
        }
        if self.server.secret_env.trim().is_empty() {
            return Err(crate::Error::Config("secret_env must not be empty".to_string()));
        }
        if self.session.ttl_secs == 0 {
            return Err(crate::Error::Config("ttl_secs must be > 0".to_string()));
        }
        if !(8..=SIGNATURE_HEX_LEN).contains(&self.session.session_id_len) {
            return Err(crate::Error::Config(format!(
                "session_id_len must be in [8, {}], got {}",
                SIGNATURE_HEX_LEN, self.session.session_id_len
            )));
        }
        self.thresholds.validate()
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".motion_attest").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Toml(e.to_string()))
    }
}
