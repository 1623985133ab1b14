//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$HASHMAIL_CONFIG` (environment variable)
//! 2. `~/.config/hashmail/config.toml` (Linux/macOS)
//!    `%APPDATA%\hashmail\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mail::{Server, ServerOptions};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Outgoing mail server.
    pub smtp: SmtpConfig,
    /// Message defaults.
    pub message: MessageConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Outgoing mail server settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Leave empty for servers that accept unauthenticated mail.
    pub username: String,
    pub password: String,
    /// Negotiate TLS (implicit on port 465, STARTTLS otherwise).
    pub ssl: bool,
    /// Accept invalid certificates. Test servers only.
    pub skip_ssl_verify: bool,
    /// Per-operation network timeout in seconds (0 = transport default).
    pub timeout_secs: u64,
    /// `EHLO` name (default: local host name).
    pub hello_name: Option<String>,
}

/// Message defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Sender used when none is given on the command line.
    pub from: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            ssl: true,
            skip_ssl_verify: false,
            timeout_secs: 0,
            hello_name: None,
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ssl", &self.ssl)
            .field("skip_ssl_verify", &self.skip_ssl_verify)
            .field("timeout_secs", &self.timeout_secs)
            .field("hello_name", &self.hello_name)
            .finish()
    }
}

impl SmtpConfig {
    /// Connection options described by this section.
    pub fn server_options(&self) -> ServerOptions {
        let mut options = ServerOptions::default();
        if !self.ssl {
            options = options.without_ssl();
        }
        if self.skip_ssl_verify {
            options = options.skip_ssl_verify();
        }
        if self.timeout_secs > 0 {
            options = options.timeout(Duration::from_secs(self.timeout_secs));
        }
        if let Some(ref name) = self.hello_name {
            options = options.hello_name(name.clone());
        }
        options
    }

    /// Build a [`Server`] from this section.
    pub fn to_server(&self) -> Server {
        Server::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
            self.server_options(),
        )
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location and return the path written.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(path)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("HASHMAIL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("hashmail").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hashmail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.smtp.host, "localhost");
        assert_eq!(cfg.smtp.port, 587);
        assert!(cfg.smtp.ssl);
        assert!(!cfg.smtp.skip_ssl_verify);
        assert!(cfg.message.from.is_empty());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.smtp.host = "mail.example.com".to_string();
        cfg.smtp.timeout_secs = 30;
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.smtp.host, "mail.example.com");
        assert_eq!(parsed.smtp.timeout_secs, 30);
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[smtp]
host = "smtp.example.org"
port = 465
skip_ssl_verify = true

[message]
from = "bot@example.org"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.smtp.host, "smtp.example.org");
        assert_eq!(cfg.smtp.port, 465);
        assert_eq!(cfg.message.from, "bot@example.org");
        // Other fields use defaults
        assert!(cfg.smtp.ssl);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_server_options_from_config() {
        let cfg = SmtpConfig {
            ssl: false,
            skip_ssl_verify: true,
            timeout_secs: 5,
            hello_name: Some("client.example".to_string()),
            ..SmtpConfig::default()
        };
        let opts = cfg.server_options();
        assert!(!opts.ssl);
        assert!(opts.skip_ssl_verify);
        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
        assert_eq!(opts.hello_name.as_deref(), Some("client.example"));

        let server = cfg.to_server();
        assert_eq!(server.host(), "localhost");
        assert!(!server.ssl_enabled());
        assert!(server.ssl_verify_skipped());
    }

    #[test]
    fn test_zero_timeout_keeps_default() {
        assert_eq!(SmtpConfig::default().server_options().timeout, None);
    }

    #[test]
    fn test_debug_hides_password() {
        let cfg = SmtpConfig {
            password: "hunter2".to_string(),
            ..SmtpConfig::default()
        };
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
