//! Property-based tests using proptest
//!
//! These check the wire-format invariants over randomly generated ids,
//! packet types, bodies and chunkings.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::BytesMut;
use proptest::prelude::*;
use rcon_core::{
    MAX_BODY_SIZE, MAX_FRAME_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE, Packet, PacketType,
    RconCodec, RconError,
};
use tokio_util::codec::Decoder;

// Property: any body up to the limit encodes and decodes unchanged
proptest! {
    #[test]
    fn prop_packet_roundtrip(
        id in any::<i32>(),
        packet_type in any::<i32>(),
        body in prop::collection::vec(any::<u8>(), 0..=MAX_BODY_SIZE),
    ) {
        let packet = Packet::new(PacketType(packet_type), id, body.clone());
        let bytes = packet.to_bytes().expect("encoding should not fail");

        prop_assert_eq!(bytes.len(), body.len() + 14);
        prop_assert_eq!(&bytes[bytes.len() - 2..], &[0u8, 0][..]);

        let decoded = Packet::from_bytes(&bytes).expect("decoding should not fail");
        prop_assert_eq!(decoded.size(), body.len() as i32 + MIN_PACKET_SIZE);
        prop_assert_eq!(decoded.id(), id);
        prop_assert_eq!(decoded.packet_type(), PacketType(packet_type));
        prop_assert_eq!(decoded.body(), &body[..]);
    }
}

// Property: bodies past the limit never produce a frame
proptest! {
    #[test]
    fn prop_oversized_body_rejected(extra in 1usize..512) {
        let packet = Packet::command(1, vec![b'x'; MAX_BODY_SIZE + extra]);
        let mut buf = BytesMut::new();

        match packet.encode_into(&mut buf) {
            Err(RconError::FrameTooLarge { size, max }) => {
                prop_assert_eq!(size, MAX_FRAME_SIZE + extra);
                prop_assert_eq!(max, MAX_FRAME_SIZE);
            }
            other => prop_assert!(false, "expected FrameTooLarge, got {:?}", other),
        }
        prop_assert!(buf.is_empty());
    }
}

// Property: a size field below the minimum is rejected before any body is read
proptest! {
    #[test]
    fn prop_undersized_frame_rejected(size in i32::MIN..MIN_PACKET_SIZE) {
        let mut codec = RconCodec;
        let mut buf = BytesMut::from(&size.to_le_bytes()[..]);

        match codec.decode(&mut buf) {
            Err(RconError::FrameTooSmall { size: got }) => prop_assert_eq!(got, size),
            other => prop_assert!(false, "expected FrameTooSmall, got {:?}", other),
        }
    }
}

// Property: a size field above the maximum is rejected before any body is read
proptest! {
    #[test]
    fn prop_oversized_frame_rejected(size in (MAX_PACKET_SIZE + 1)..=i32::MAX) {
        let mut codec = RconCodec;
        let mut buf = BytesMut::from(&size.to_le_bytes()[..]);

        match codec.decode(&mut buf) {
            Err(RconError::OversizedFrame { size: got }) => prop_assert_eq!(got, size),
            other => prop_assert!(false, "expected OversizedFrame, got {:?}", other),
        }
    }
}

// Property: the stream decoder yields the same packet however the bytes arrive
proptest! {
    #[test]
    fn prop_decode_any_chunking(
        id in any::<i32>(),
        body in prop::collection::vec(any::<u8>(), 0..256),
        chunk in 1usize..32,
    ) {
        let packet = Packet::new(PacketType::RESPONSE_VALUE, id, body);
        let bytes = packet.to_bytes().unwrap();

        let mut codec = RconCodec;
        let mut buf = BytesMut::new();
        let mut decoded = None;
        for piece in bytes.chunks(chunk) {
            prop_assert!(decoded.is_none());
            buf.extend_from_slice(piece);
            decoded = codec.decode(&mut buf).unwrap();
        }

        prop_assert_eq!(decoded, Some(packet));
        prop_assert!(buf.is_empty());
    }
}

// Property: decoding arbitrary bytes returns a result and never panics
proptest! {
    #[test]
    fn prop_from_bytes_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = Packet::from_bytes(&data);
    }
}
