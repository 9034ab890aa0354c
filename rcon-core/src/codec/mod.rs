//! `RconCodec` frames an RCON byte stream for `tokio_util::codec::Framed`.
//!
//! Decoding reads the size field first and rejects undersized or
//! oversized frames before waiting for, or buffering room for, a body.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::RconError;
use crate::packet::{self, Packet, SIZE_FIELD_LENGTH};

/// Stateless packet codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct RconCodec;

impl RconCodec {
    /// Total frame length announced by the bytes at the front of `src`,
    /// once the size field has arrived and passed validation.
    fn frame_len(src: &BytesMut) -> Result<Option<usize>, RconError> {
        if src.len() < SIZE_FIELD_LENGTH {
            return Ok(None);
        }
        let mut size_bytes = [0u8; SIZE_FIELD_LENGTH];
        size_bytes.copy_from_slice(&src[..SIZE_FIELD_LENGTH]);
        let remaining = packet::check_size(i32::from_le_bytes(size_bytes))?;
        Ok(Some(SIZE_FIELD_LENGTH + remaining))
    }
}

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = RconError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame_len) = Self::frame_len(src)? else {
            return Ok(None);
        };

        if src.len() < frame_len {
            // `frame_len` is bounded by `MAX_FRAME_SIZE` once validated.
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let size = src.get_i32_le();
        let frame = src.split_to(frame_len - SIZE_FIELD_LENGTH);
        Packet::decode_fields(size, &frame).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(packet) = self.decode(src)? {
            return Ok(Some(packet));
        }
        if src.is_empty() {
            return Ok(None);
        }

        let expected = Self::frame_len(src)?.unwrap_or(SIZE_FIELD_LENGTH);
        Err(RconError::ShortRead {
            expected,
            actual: src.len(),
        })
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = RconError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode_into(dst)
    }
}

// ── Tests ────────────────────────────────────────────────────────
