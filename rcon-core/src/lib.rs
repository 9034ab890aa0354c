//! # rcon-core
//!
//! Client library for the RCON remote administration protocol spoken by
//! Source-engine and compatible game servers.
//!
//! This crate contains:
//! - **Packet**: `Packet`, `PacketType` and the wire constants
//! - **Codec**: `RconCodec` for framed TCP I/O via `tokio_util`
//! - **Network**: `Endpoint` and `dial`, the TCP transport
//! - **State**: `SessionPhase`, the validated session state machine
//! - **Session**: `Session`, which authenticates and executes commands
//! - **Config**: `SessionConfig` with serde support
//! - **Error**: `RconError`, a typed, `thiserror`-based error hierarchy

pub mod codec;
pub mod config;
pub mod error;
pub mod network;
pub mod packet;
pub mod session;
pub mod state;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::RconCodec;
pub use config::SessionConfig;
pub use error::{RconError, Result};
pub use network::{DEFAULT_PORT, Endpoint, dial};
pub use packet::{
    MAX_BODY_SIZE, MAX_FRAME_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE, Packet, PacketType,
};
pub use session::{AuthOutcome, Session};
pub use state::SessionPhase;
