use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{RconError, Result};

/// Default RCON port used by Source-engine servers.
pub const DEFAULT_PORT: u16 = 27015;

/// Address of a remote console endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bracket IPv6 literals so the result is a valid socket address.
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = RconError;

    /// Parses `host:port`, `[v6]:port`, or a bare host (default port).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RconError::Config("empty endpoint".into()));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| RconError::Config(format!("unterminated IPv6 literal: {s}")))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None if tail.is_empty() => DEFAULT_PORT,
                None => return Err(RconError::Config(format!("invalid endpoint: {s}"))),
            };
            return Ok(Self::new(host, port));
        }

        match s.rsplit_once(':') {
            // More than one colon without brackets: a bare IPv6 address.
            Some((host, _)) if host.contains(':') => Ok(Self::new(s, DEFAULT_PORT)),
            Some((host, port)) => Ok(Self::new(host, parse_port(port)?)),
            None => Ok(Self::new(s, DEFAULT_PORT)),
        }
    }
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|e| RconError::Config(format!("invalid port {port:?}: {e}")))
}

/// Open a TCP connection to `endpoint`, giving up after `timeout`.
///
/// The timeout bounds connection establishment only.
pub async fn dial(endpoint: &Endpoint, timeout: Duration) -> Result<TcpStream> {
    let addr = endpoint.to_string();
    debug!(%addr, ?timeout, "dialing");

    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr.as_str()))
        .await
        .map_err(|_| RconError::ConnectTimeout {
            endpoint: addr.clone(),
            timeout,
        })?
        .map_err(|source| RconError::Connect {
            endpoint: addr.clone(),
            source,
        })?;

    // Request/response traffic is tiny; do not let Nagle hold it back.
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }
    Ok(stream)
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn parse_host_and_port() {
        let ep: Endpoint = "example.com:25575".parse().unwrap();
        assert_eq!(ep.host(), "example.com");
        assert_eq!(ep.port(), 25575);
        assert_eq!(ep.to_string(), "example.com:25575");
    }

    #[test]
    fn parse_bare_host_uses_default_port() {
        let ep: Endpoint = "10.0.0.2".parse().unwrap();
        assert_eq!(ep.port(), DEFAULT_PORT);
    }

    #[test]
    fn parse_ipv6() {
        let ep: Endpoint = "[::1]:27016".parse().unwrap();
        assert_eq!(ep.host(), "::1");
        assert_eq!(ep.port(), 27016);
        assert_eq!(ep.to_string(), "[::1]:27016");

        let bare: Endpoint = "::1".parse().unwrap();
        assert_eq!(bare.host(), "::1");
        assert_eq!(bare.port(), DEFAULT_PORT);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Endpoint>().is_err());
        assert!("host:notaport".parse::<Endpoint>().is_err());
        assert!("host:70000".parse::<Endpoint>().is_err());
        assert!("[::1".parse::<Endpoint>().is_err());
    }

    #[tokio::test]
    async fn dial_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let ep = Endpoint::new("127.0.0.1", port);

        let stream = dial(&ep, Duration::from_secs(5)).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn dial_refused_is_connect_error() {
        // Bind then drop to get a port that is very likely closed.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let ep = Endpoint::new("127.0.0.1", port);

        match dial(&ep, Duration::from_secs(5)).await {
            Err(RconError::Connect { endpoint, .. }) => {
                assert_eq!(endpoint, format!("127.0.0.1:{port}"));
            }
            other => panic!("expected Connect error, got {other:?}"),
        }
    }
}
