//! The session engine.
//!
//! A `Session` owns one byte stream and drives the two RCON exchanges,
//! authentication and command execution. Each is a single write followed
//! by a single read; there is never more than one request in flight.
//!
//! ```no_run
//! # async fn run() -> rcon_core::Result<()> {
//! use rcon_core::{Endpoint, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::new(Endpoint::new("127.0.0.1", 27015)));
//! session.connect().await?;
//! session.authenticate("secret").await?;
//! let status = session.execute("status").await?;
//! println!("{status}");
//! session.close().await;
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::future::Future;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument, warn};

use crate::codec::RconCodec;
use crate::config::SessionConfig;
use crate::error::{RconError, Result};
use crate::network;
use crate::packet::{AUTH_FAILED_ID, Packet, PacketType, SIZE_FIELD_LENGTH};
use crate::state::SessionPhase;

// ── AuthOutcome ──────────────────────────────────────────────────

/// Result of an authentication exchange that was not rejected.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The server accepted the password; the session is authenticated.
    Accepted,

    /// The server answered with an id below the rejection sentinel.
    /// This is neither a success nor a rejection; the session stays
    /// unauthenticated.
    Unconfirmed { id: i32 },
}

impl AuthOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ── Session ──────────────────────────────────────────────────────

/// One RCON connection plus its protocol state.
///
/// Not meant for concurrent use: callers that share a session must
/// serialize access themselves (e.g. behind a `tokio::sync::Mutex`).
#[derive(Debug)]
pub struct Session<S = TcpStream> {
    config: SessionConfig,
    framed: Option<Framed<S, RconCodec>>,
    last_id: i32,
    phase: SessionPhase,
}

impl Session<TcpStream> {
    /// Create an unconnected session. Call `connect` before anything else.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            framed: None,
            last_id: 0,
            phase: SessionPhase::Disconnected,
        }
    }

    /// Dial the configured endpoint.
    ///
    /// On failure the session stays `Disconnected`.
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn connect(&mut self) -> Result<()> {
        self.phase.require_disconnected("connect")?;

        let stream = network::dial(&self.config.endpoint, self.config.connect_timeout).await?;
        self.install(stream)?;

        info!("connected");
        Ok(())
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-established byte stream. The session starts in
    /// the `Connected` phase.
    pub fn attach(config: SessionConfig, stream: S) -> Self {
        Self {
            config,
            framed: Some(Framed::new(stream, RconCodec)),
            last_id: 0,
            phase: SessionPhase::Connected {
                since: Instant::now(),
            },
        }
    }

    fn install(&mut self, stream: S) -> Result<()> {
        self.phase.connected()?;
        self.framed = Some(Framed::new(stream, RconCodec));
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase.is_authenticated()
    }

    /// The correlation id of the most recently sent packet (0 before the
    /// first one).
    pub fn last_id(&self) -> i32 {
        self.last_id
    }

    /// Send the password and wait for the server's verdict.
    ///
    /// Valid only while `Connected`. A rejected password returns
    /// `AuthFailed` and leaves the session connected so the caller may
    /// retry.
    #[instrument(skip(self, password), fields(endpoint = %self.config.endpoint))]
    pub async fn authenticate(&mut self, password: &str) -> Result<AuthOutcome> {
        self.phase.require_connected("authenticate")?;

        let id = self.next_id()?;
        self.send(Packet::auth(id, password)).await?;
        let response = self.recv().await?;

        if response.packet_type() != PacketType::AUTH_RESPONSE {
            warn!(actual = %response.packet_type(), "unexpected authentication response type");
            return Err(RconError::ProtocolMismatch {
                expected: PacketType::AUTH_RESPONSE,
                actual: response.packet_type(),
            });
        }

        match response.id().cmp(&AUTH_FAILED_ID) {
            Ordering::Equal => {
                warn!("password rejected");
                Err(RconError::AuthFailed)
            }
            Ordering::Greater => {
                self.phase.authenticated()?;
                info!(id = response.id(), "authenticated");
                Ok(AuthOutcome::Accepted)
            }
            Ordering::Less => {
                warn!(id = response.id(), "authentication neither accepted nor rejected");
                Ok(AuthOutcome::Unconfirmed { id: response.id() })
            }
        }
    }

    /// Run a command and return the raw response body.
    ///
    /// Fails with `NotAuthenticated`, without touching the connection,
    /// unless a previous `authenticate` was accepted.
    pub async fn execute_raw(&mut self, command: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        self.phase.require_authenticated()?;

        let id = self.next_id()?;
        self.send(Packet::command(id, command)).await?;
        let response = self.recv().await?;

        if response.id() != id {
            warn!(expected = id, actual = response.id(), "response does not match request");
            return Err(RconError::CorrelationMismatch {
                expected: id,
                actual: response.id(),
            });
        }

        Ok(response.into_body())
    }

    /// Run a command and return the response body as text.
    #[instrument(skip(self, command), fields(endpoint = %self.config.endpoint))]
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        let body = self.execute_raw(command).await?;
        String::from_utf8(body).map_err(|e| RconError::InvalidUtf8(e.utf8_error()))
    }

    /// Release the connection. The session cannot be used afterwards.
    pub async fn close(self) {
        let Some(framed) = self.framed else {
            return;
        };

        let mut stream = framed.into_inner();
        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "shutdown failed; dropping stream");
        }
        info!(last_id = self.last_id, "session closed");
    }

    // ── Internals ────────────────────────────────────────────────

    /// Advance the correlation counter. Ids are never reused, so the
    /// counter refuses to wrap.
    fn next_id(&mut self) -> Result<i32> {
        let id = self.last_id.checked_add(1).ok_or(RconError::IdsExhausted)?;
        self.last_id = id;
        Ok(id)
    }

    fn framed_mut(&mut self, operation: &'static str) -> Result<&mut Framed<S, RconCodec>> {
        match self.framed.as_mut() {
            Some(framed) => Ok(framed),
            None => Err(RconError::InvalidState {
                operation,
                phase: self.phase.clone(),
            }),
        }
    }

    async fn send(&mut self, packet: Packet) -> Result<()> {
        let timeout = self.config.io_timeout;
        debug!(
            id = packet.id(),
            packet_type = %packet.packet_type(),
            len = packet.body().len(),
            "sending packet"
        );

        let framed = self.framed_mut("send")?;
        with_io_timeout(timeout, async {
            framed.send(packet).await.map_err(RconError::on_write)
        })
        .await
    }

    async fn recv(&mut self) -> Result<Packet> {
        let timeout = self.config.io_timeout;
        let framed = self.framed_mut("receive")?;

        let packet = with_io_timeout(timeout, async {
            match framed.next().await {
                Some(result) => result.map_err(RconError::on_read),
                None => Err(RconError::ShortRead {
                    expected: SIZE_FIELD_LENGTH,
                    actual: 0,
                }),
            }
        })
        .await?;

        debug!(
            id = packet.id(),
            packet_type = %packet.packet_type(),
            len = packet.body().len(),
            "received packet"
        );
        Ok(packet)
    }
}

/// Apply the optional per-operation deadline.
async fn with_io_timeout<T, F>(timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| RconError::Timeout(limit))?,
        None => fut.await,
    }
}

// ── Tests ────────────────────────────────────────────────────────
