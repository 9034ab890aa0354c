//! Configuration for the command-line client.

use std::path::Path;

use serde::{Deserialize, Serialize};

use rcon_core::{Endpoint, RconError, SessionConfig};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Which server to talk to, and how.
///
/// Connection keys (`host`, `port`, `connect_timeout_ms`, `io_timeout_ms`)
/// sit directly in `[server]` next to the password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// RCON password. Usually left empty here and passed via `RCON_PASSWORD`.
    pub password: String,
    #[serde(flatten)]
    pub session: SessionConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults. An unreadable or unparsable
    /// file is an error.
    pub fn load(path: &Path) -> rcon_core::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).map_err(|e| {
                RconError::Config(format!("invalid config {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(RconError::Config(format!(
                "cannot read config {}: {e}",
                path.display()
            ))),
        }
    }

    /// Parse configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The default configuration as a TOML document.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }

    /// Replace file values with whatever was given on the command line.
    pub fn apply_overrides(
        &mut self,
        host: Option<String>,
        port: Option<u16>,
        password: Option<String>,
    ) {
        let endpoint = &self.server.session.endpoint;
        if host.is_some() || port.is_some() {
            let host = host.unwrap_or_else(|| endpoint.host().to_string());
            let port = port.unwrap_or(endpoint.port());
            self.server.session.endpoint = Endpoint::new(host, port);
        }
        if let Some(password) = password {
            self.server.password = password;
        }
    }

    /// The validated session settings.
    pub fn to_session_config(&self) -> rcon_core::Result<SessionConfig> {
        self.server.session.validate_strict()?;
        Ok(self.server.session.clone())
    }

    /// Fail early when there is no password to authenticate with.
    pub fn require_password(&self) -> rcon_core::Result<&str> {
        if self.server.password.is_empty() {
            return Err(RconError::Config(
                "no password: set [server].password, --password or RCON_PASSWORD".into(),
            ));
        }
        Ok(&self.server.password)
    }
}

// ── Tests ────────────────────────────────────────────────────────
