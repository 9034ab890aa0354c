//! Domain-specific error types for the RCON client.
//!
//! All fallible operations return `Result<T, RconError>`.
//! Malformed wire data and protocol violations are never repaired
//! silently; each one surfaces as its own variant with the expected and
//! actual values attached.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::packet::PacketType;
use crate::state::SessionPhase;

/// The canonical error type for the RCON client.
#[derive(Debug, Error)]
pub enum RconError {
    // ── Connection Errors ────────────────────────────────────────
    /// The transport could not establish a connection.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// The transport did not finish dialing within the configured timeout.
    #[error("connecting to {endpoint} timed out after {timeout:?}")]
    ConnectTimeout { endpoint: String, timeout: Duration },

    /// Sending a frame failed mid-exchange.
    #[error("write error: {0}")]
    Write(#[source] io::Error),

    /// Receiving a frame failed mid-exchange.
    #[error("read error: {0}")]
    Read(#[source] io::Error),

    /// An I/O error raised by the codec before the session could tag it
    /// as a read or a write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single send or receive exceeded the configured I/O timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // ── Frame Errors ─────────────────────────────────────────────
    /// The stream ended before a complete frame could be read.
    #[error("short read: frame needs {expected} bytes, stream ended after {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The declared frame size is below the protocol minimum.
    #[error("frame too small: declared size {size} (min {min})", min = crate::packet::MIN_PACKET_SIZE)]
    FrameTooSmall { size: i32 },

    /// The declared frame size is above the protocol maximum.
    #[error("oversized frame: declared size {size} (max {max})", max = crate::packet::MAX_PACKET_SIZE)]
    OversizedFrame { size: i32 },

    /// The encoded frame exceeds the protocol maximum.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The frame body is shorter than the two-byte terminator.
    #[error("malformed trailer: body of {len} bytes cannot hold the terminator")]
    MalformedTrailer { len: usize },

    // ── Protocol Errors ──────────────────────────────────────────
    /// The response carried a packet type other than the one expected.
    #[error("protocol mismatch: expected packet type {expected}, got {actual}")]
    ProtocolMismatch {
        expected: PacketType,
        actual: PacketType,
    },

    /// The server rejected the password.
    #[error("authentication failed: password rejected")]
    AuthFailed,

    /// The response does not belong to the outstanding request.
    #[error("correlation mismatch: sent id {expected}, response id {actual}")]
    CorrelationMismatch { expected: i32, actual: i32 },

    /// A command was issued before authentication succeeded.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The operation is not valid in the session's current phase.
    #[error("cannot {operation}: session is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: SessionPhase,
    },

    /// Every positive correlation id has been used on this session.
    #[error("correlation ids exhausted")]
    IdsExhausted,

    // ── Payload / Configuration Errors ───────────────────────────
    /// The response body is not valid UTF-8.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RconError {
    /// Re-tag a generic codec I/O error as a write failure.
    pub(crate) fn on_write(self) -> Self {
        match self {
            RconError::Io(e) => RconError::Write(e),
            other => other,
        }
    }

    /// Re-tag a generic codec I/O error as a read failure.
    pub(crate) fn on_read(self) -> Self {
        match self {
            RconError::Io(e) => RconError::Read(e),
            other => other,
        }
    }

    /// Returns `true` for errors caused by malformed wire data.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            RconError::ShortRead { .. }
                | RconError::FrameTooSmall { .. }
                | RconError::OversizedFrame { .. }
                | RconError::FrameTooLarge { .. }
                | RconError::MalformedTrailer { .. }
        )
    }

    /// Returns `true` when the connection should be considered unusable
    /// and the caller should reconnect before trying again.
    pub fn is_fatal(&self) -> bool {
        match self {
            RconError::AuthFailed
            | RconError::NotAuthenticated
            | RconError::InvalidState { .. }
            | RconError::InvalidUtf8(_)
            | RconError::Config(_) => false,
            // An oversized request is rejected before any byte is written.
            RconError::FrameTooLarge { .. } => false,
            _ => true,
        }
    }
}

/// Type alias for results using `RconError`.
pub type Result<T> = std::result::Result<T, RconError>;
