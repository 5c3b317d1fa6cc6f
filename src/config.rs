//! Configuration module
//!
//! Settings are read from a TOML file (default
//! `~/.config/ocpp-webhook/config.toml`). Every section and key is optional;
//! anything left out takes the value shown in [`AppConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::application::render::{RenderOptions, ResponseColorPolicy};
use crate::support::errors::ConfigError;

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "OCPP_WEBHOOK_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub render: RenderConfig,
    pub metrics: MetricsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests after a shutdown signal.
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `ocpp_webhook=debug`.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// How event blocks look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub ansi: bool,
    pub response_color: ResponseColorPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ansi: true,
            response_color: ResponseColorPolicy::Always,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(cfg: &RenderConfig) -> Self {
        Self {
            ansi: cfg.ansi,
            response_color: cfg.response_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Expose `GET /metrics` in Prometheus text format.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::from(&self.render)
    }
}

/// `$OCPP_WEBHOOK_CONFIG`, or `<config dir>/ocpp-webhook/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocpp-webhook")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.address(), "0.0.0.0:3000");
        assert_eq!(cfg.server.shutdown_timeout, 30);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.render_options(), RenderOptions::default());
        assert!(cfg.metrics.enabled);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [render]
            response_color = "status-accepted"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.render.ansi);
        assert_eq!(cfg.render.response_color, ResponseColorPolicy::StatusAccepted);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\nformat = \"json\"\n\n[render]\nansi = false").unwrap();

        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, "json");
        assert!(!cfg.render_options().ansi);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nresponse_color = \"sometimes\"").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
