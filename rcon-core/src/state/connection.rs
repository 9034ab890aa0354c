//! Session state machine.
//!
//! `SessionPhase` models the lifecycle of one RCON session, with
//! validated transitions that return `Result` instead of panicking.

use std::time::{Duration, Instant};

use crate::error::{RconError, Result};

// ── SessionPhase ─────────────────────────────────────────────────

/// The current phase of an RCON session.
///
/// ```text
///  Disconnected ──► Connected ──► Authenticated
///                      ▲  │
///                      └──┘ rejected / unconfirmed password
/// ```
///
/// Closing is terminal and consumes the session, so it has no phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No connection yet.
    #[default]
    Disconnected,

    /// TCP link is up; the password has not been accepted.
    Connected {
        /// When the connection was established.
        since: Instant,
    },

    /// The server accepted the password; commands may be executed.
    Authenticated {
        /// When authentication succeeded.
        since: Instant,
    },
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected { .. } => write!(f, "Connected"),
            Self::Authenticated { .. } => write!(f, "Authenticated"),
        }
    }
}

impl SessionPhase {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    /// Returns `true` when a connection exists, authenticated or not.
    pub fn is_connected(&self) -> bool {
        !self.is_disconnected()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// How long the session has been in its current phase.
    ///
    /// Returns `None` while disconnected.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::Disconnected => None,
            Self::Connected { since } | Self::Authenticated { since } => Some(since.elapsed()),
        }
    }

    // ── Guards ───────────────────────────────────────────────────

    /// Fail unless no connection has been made yet.
    pub fn require_disconnected(&self, operation: &'static str) -> Result<()> {
        match self {
            Self::Disconnected => Ok(()),
            _ => Err(self.invalid(operation)),
        }
    }

    /// Fail unless the session is connected but not yet authenticated.
    pub fn require_connected(&self, operation: &'static str) -> Result<()> {
        match self {
            Self::Connected { .. } => Ok(()),
            _ => Err(self.invalid(operation)),
        }
    }

    /// Fail with `NotAuthenticated` unless authentication succeeded.
    pub fn require_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(RconError::NotAuthenticated)
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Connected`.
    ///
    /// Valid from: `Disconnected`.
    pub fn connected(&mut self) -> Result<()> {
        self.require_disconnected("connect")?;
        *self = Self::Connected {
            since: Instant::now(),
        };
        Ok(())
    }

    /// Transition to `Authenticated`.
    ///
    /// Valid from: `Connected`.
    pub fn authenticated(&mut self) -> Result<()> {
        self.require_connected("authenticate")?;
        *self = Self::Authenticated {
            since: Instant::now(),
        };
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> RconError {
        RconError::InvalidState {
            operation,
            phase: self.clone(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_lifecycle() {
        let mut phase = SessionPhase::default();
        assert!(phase.is_disconnected());
        assert!(phase.elapsed().is_none());

        phase.connected().unwrap();
        assert!(phase.is_connected());
        assert!(!phase.is_authenticated());

        phase.authenticated().unwrap();
        assert!(phase.is_authenticated());
        assert!(phase.elapsed().is_some());
    }

    #[test]
    fn connect_twice_is_invalid() {
        let mut phase = SessionPhase::default();
        phase.connected().unwrap();
        match phase.connected() {
            Err(RconError::InvalidState { operation, phase }) => {
                assert_eq!(operation, "connect");
                assert_eq!(phase.to_string(), "Connected");
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn authenticate_requires_connection() {
        let mut phase = SessionPhase::Disconnected;
        assert!(matches!(
            phase.authenticated(),
            Err(RconError::InvalidState { .. })
        ));
        assert!(phase.is_disconnected());
    }

    #[test]
    fn authenticate_only_once() {
        let mut phase = SessionPhase::Authenticated {
            since: Instant::now(),
        };
        assert!(phase.require_connected("authenticate").is_err());
        assert!(phase.authenticated().is_err());
        assert!(phase.is_authenticated());
    }

    #[test]
    fn commands_require_authentication() {
        let connected = SessionPhase::Connected {
            since: Instant::now(),
        };
        assert!(matches!(
            connected.require_authenticated(),
            Err(RconError::NotAuthenticated)
        ));
        assert!(matches!(
            SessionPhase::Disconnected.require_authenticated(),
            Err(RconError::NotAuthenticated)
        ));
    }

    #[test]
    fn display_format() {
        assert_eq!(SessionPhase::Disconnected.to_string(), "Disconnected");
        assert_eq!(
            SessionPhase::Connected {
                since: Instant::now()
            }
            .to_string(),
            "Connected"
        );
        assert_eq!(
            SessionPhase::Authenticated {
                since: Instant::now()
            }
            .to_string(),
            "Authenticated"
        );
    }
}
