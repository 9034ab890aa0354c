//! Session configuration.
//!
//! A session is built from an endpoint and its timeouts. Serialized, it is
//! one flat table:
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 27015
//! connect_timeout_ms = 5000
//! io_timeout_ms = 2000   # optional
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RconError, Result};
use crate::network::Endpoint;

/// Default time allowed for establishing the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for one `Session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Server to connect to.
    #[serde(flatten)]
    pub endpoint: Endpoint,

    /// Deadline for establishing the connection.
    #[serde(rename = "connect_timeout_ms", with = "duration_ms")]
    pub connect_timeout: Duration,

    /// Optional deadline applied to each individual send and receive.
    /// `None` lets a stalled peer block an exchange indefinitely.
    #[serde(
        rename = "io_timeout_ms",
        with = "option_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub io_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: None,
        }
    }
}

impl SessionConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Validate the configuration.
    ///
    /// Returns a list of problems; an empty list means the configuration
    /// is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.endpoint.host().is_empty() {
            errors.push("Endpoint host cannot be empty".to_string());
        }
        if self.endpoint.port() == 0 {
            errors.push("Endpoint port cannot be 0".to_string());
        }
        if self.connect_timeout.is_zero() {
            errors.push("Connect timeout must be greater than 0".to_string());
        }
        if self.io_timeout.is_some_and(|t| t.is_zero()) {
            errors.push("I/O timeout must be greater than 0 when set".to_string());
        }

        errors
    }

    /// Validate and return `Result` - convenience method.
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RconError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// `Duration` as integer milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// `Option<Duration>` as optional integer milliseconds.
pub mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

// ── Tests ────────────────────────────────────────────────────────
