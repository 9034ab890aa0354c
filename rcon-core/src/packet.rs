//! RCON packet model and byte-level encoding.
//!
//! ## Wire format
//!
//! All integers are little-endian `i32`.
//!
//! ```text
//! size:           i32  (4)   bytes following this field
//! id:             i32  (4)   correlation id, echoed by the server
//! type:           i32  (4)   see `PacketType`
//! body:           [u8] (size - 10)
//! terminator:     [u8; 2]    always zero
//! ```

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{RconError, Result};

// ── Constants ────────────────────────────────────────────────────

/// Width of the leading size field. The size value does not count it.
pub const SIZE_FIELD_LENGTH: usize = 4;
/// Width of the correlation id field.
pub const ID_LENGTH: usize = 4;
/// Width of the packet type field.
pub const TYPE_LENGTH: usize = 4;
/// Two zero bytes closing every frame.
pub const TERMINATOR: [u8; 2] = [0, 0];
pub const TERMINATOR_LENGTH: usize = TERMINATOR.len();

/// Smallest legal value of the size field: id + type + terminator.
pub const MIN_PACKET_SIZE: i32 = (ID_LENGTH + TYPE_LENGTH + TERMINATOR_LENGTH) as i32;
/// Largest fully encoded frame, size field included.
pub const MAX_FRAME_SIZE: usize = 4096;
/// Largest legal value of the size field.
pub const MAX_PACKET_SIZE: i32 = (MAX_FRAME_SIZE - SIZE_FIELD_LENGTH) as i32;
/// Largest body that still fits in `MAX_FRAME_SIZE`.
pub const MAX_BODY_SIZE: usize = MAX_FRAME_SIZE - SIZE_FIELD_LENGTH - MIN_PACKET_SIZE as usize;

/// Correlation id the server answers with when the password is wrong.
pub const AUTH_FAILED_ID: i32 = -1;

// ── PacketType ───────────────────────────────────────────────────

/// The type tag of a packet.
///
/// Modelled as a newtype rather than an enum: the protocol reuses tag `2`
/// for both the authentication response and the command request, and a
/// server may send tags this client does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketType(pub i32);

impl PacketType {
    /// Response to a command request.
    pub const RESPONSE_VALUE: PacketType = PacketType(0);
    /// Command request (client → server).
    pub const EXEC_COMMAND: PacketType = PacketType(2);
    /// Authentication result (server → client).
    pub const AUTH_RESPONSE: PacketType = PacketType(2);
    /// Authentication request carrying the password.
    pub const AUTH: PacketType = PacketType(3);

    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Symbolic name, as seen from the client's receiving side.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "RESPONSE_VALUE",
            2 => "AUTH_RESPONSE",
            3 => "AUTH",
            _ => "UNKNOWN",
        }
    }
}

impl From<i32> for PacketType {
    fn from(value: i32) -> Self {
        PacketType(value)
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

// ── Packet ───────────────────────────────────────────────────────

/// One unit of exchange. The body never includes the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    size: i32,
    id: i32,
    packet_type: PacketType,
    body: Vec<u8>,
}

impl Packet {
    /// Build a packet, deriving the size field from the body length.
    pub fn new(packet_type: PacketType, id: i32, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let size = (body.len() as i32).saturating_add(MIN_PACKET_SIZE);
        Self {
            size,
            id,
            packet_type,
            body,
        }
    }

    /// Build a packet with an explicit size field.
    ///
    /// The codec writes `size` as given; it is up to the caller to keep it
    /// consistent with the body.
    pub fn from_parts(size: i32, id: i32, packet_type: PacketType, body: Vec<u8>) -> Self {
        Self {
            size,
            id,
            packet_type,
            body,
        }
    }

    pub fn auth(id: i32, password: &str) -> Self {
        Self::new(PacketType::AUTH, id, password.as_bytes())
    }

    pub fn command(id: i32, command: impl Into<Vec<u8>>) -> Self {
        Self::new(PacketType::EXEC_COMMAND, id, command)
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as text, failing on invalid UTF-8.
    pub fn body_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }

    /// Number of bytes this packet occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        SIZE_FIELD_LENGTH + ID_LENGTH + TYPE_LENGTH + self.body.len() + TERMINATOR_LENGTH
    }

    /// Serialize into `dst`. Nothing is written when the frame is too large.
    pub fn encode_into(&self, dst: &mut BytesMut) -> Result<()> {
        let len = self.encoded_len();
        if len > MAX_FRAME_SIZE {
            return Err(RconError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        dst.reserve(len);
        dst.put_i32_le(self.size);
        dst.put_i32_le(self.id);
        dst.put_i32_le(self.packet_type.0);
        dst.put_slice(&self.body);
        dst.put_slice(&TERMINATOR);
        Ok(())
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Decode one complete frame from the front of `bytes`.
    ///
    /// Unlike the stream codec this treats missing bytes as a hard
    /// `ShortRead`, since no more input is coming.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut src = bytes;
        if src.len() < SIZE_FIELD_LENGTH {
            return Err(RconError::ShortRead {
                expected: SIZE_FIELD_LENGTH,
                actual: src.len(),
            });
        }
        let size = src.get_i32_le();
        let remaining = check_size(size)?;
        if src.len() < remaining {
            return Err(RconError::ShortRead {
                expected: remaining,
                actual: src.len(),
            });
        }
        Self::decode_fields(size, &src[..remaining])
    }

    /// Decode id, type and body from the `size` bytes that follow the
    /// size field.
    pub(crate) fn decode_fields(size: i32, mut frame: &[u8]) -> Result<Self> {
        if frame.len() < ID_LENGTH + TYPE_LENGTH {
            return Err(RconError::ShortRead {
                expected: ID_LENGTH + TYPE_LENGTH,
                actual: frame.len(),
            });
        }
        let id = frame.get_i32_le();
        let packet_type = PacketType(frame.get_i32_le());

        // What is left is the body plus its terminator.
        if frame.len() < TERMINATOR_LENGTH {
            return Err(RconError::MalformedTrailer { len: frame.len() });
        }
        let body = frame[..frame.len() - TERMINATOR_LENGTH].to_vec();

        Ok(Self {
            size,
            id,
            packet_type,
            body,
        })
    }
}

/// Validate a declared size and return how many bytes follow the size
/// field.
pub(crate) fn check_size(size: i32) -> Result<usize> {
    if size < MIN_PACKET_SIZE {
        return Err(RconError::FrameTooSmall { size });
    }
    if size > MAX_PACKET_SIZE {
        return Err(RconError::OversizedFrame { size });
    }
    Ok(size as usize)
}

// ── Tests ────────────────────────────────────────────────────────
