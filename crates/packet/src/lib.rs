//! The application-level packet format carrying media payloads over the
//! streaming transport.
//!
//! Layout is a fixed 5-byte header followed by the payload:
//!
//! ```text
//! offset 0..3   timestamp (u32, big-endian)
//! offset 4      frame type tag (u8)
//! offset 5..    payload
//! ```
//!
//! There is no sequence number and no checksum; ordering and delivery are
//! the transport's problem. The frame type tag is an opaque discriminator
//! for the receiver; this crate attaches no codec semantics to it.
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::{Buf, Bytes};
use nutype_enum::nutype_enum;

/// The fixed header length.
pub const HEADER_LEN: usize = 5;

nutype_enum! {
    /// The frame type tag in byte 4 of the header.
    ///
    /// Unknown values are preserved; the receiver decides how to treat them.
    pub enum FrameType(u8) {
        /// Video key frame.
        VideoKeyFrame = 0,
        /// Video inter frame.
        VideoInterFrame = 1,
        /// Audio frame.
        Audio = 2,
    }
}

impl FrameType {
    /// Whether this tag marks an audio payload.
    pub fn is_audio(self) -> bool {
        self == Self::Audio
    }
}

/// Error type for packet decoding.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// The buffer is shorter than the 5-byte header.
    #[error("packet too short: {len} bytes")]
    TooShort {
        /// The buffer length.
        len: usize,
    },
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// One media packet: header fields plus payload.
///
/// The payload is length-prefixed NAL units for video, a raw encoded frame
/// for audio; it may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPacket {
    /// Presentation timestamp, truncated to 32 bits by the sender.
    pub timestamp: u32,
    /// The frame type tag.
    pub frame_type: FrameType,
    /// The payload bytes.
    pub payload: Bytes,
}

impl MediaPacket {
    /// Creates a packet, truncating a wide timestamp to the 32-bit wire
    /// field.
    ///
    /// The wire format keeps the original 32-bit field, so a
    /// millisecond-resolution timestamp wraps after ~49 days of session
    /// time. Wrap handling, if a session ever runs that long, belongs to
    /// the session controller, not this codec.
    pub fn new(timestamp: i64, frame_type: FrameType, payload: Bytes) -> Self {
        Self {
            timestamp: timestamp as u32,
            frame_type,
            payload,
        }
    }

    /// The total serialized size.
    pub fn size(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Serializes the packet into a byte stream.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<BigEndian>(self.timestamp)?;
        writer.write_u8(self.frame_type.into())?;
        writer.write_all(&self.payload)?;
        Ok(())
    }

    /// Serializes the packet to an owned buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.size());
        // writing to a Vec cannot fail
        self.mux(&mut buf).expect("infallible write");
        Bytes::from(buf)
    }

    /// Parses a packet from a received buffer.
    ///
    /// Fails with [`PacketError::TooShort`] when the buffer cannot hold the
    /// header; everything past the header is the payload.
    pub fn demux(data: Bytes) -> Result<Self, PacketError> {
        if data.len() < HEADER_LEN {
            return Err(PacketError::TooShort { len: data.len() });
        }

        let mut reader = io::Cursor::new(data);
        let timestamp = reader.read_u32::<BigEndian>()?;
        let frame_type = FrameType::from(reader.read_u8()?);
        let payload = reader.copy_to_bytes(reader.remaining());

        Ok(Self {
            timestamp,
            frame_type,
            payload,
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_mux() {
        let packet = MediaPacket {
            timestamp: 0x01020304,
            frame_type: FrameType::VideoKeyFrame,
            payload: Bytes::from_static(&[0xAA, 0xBB]),
        };

        assert_eq!(packet.to_bytes().as_ref(), [0x01, 0x02, 0x03, 0x04, 0x00, 0xAA, 0xBB]);
        assert_eq!(packet.size(), 7);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            (0u32, FrameType::VideoKeyFrame, Bytes::new()),
            (1234, FrameType::VideoInterFrame, Bytes::from_static(&[1, 2, 3])),
            (u32::MAX, FrameType::Audio, Bytes::from_static(&[0; 64])),
            (42, FrameType(200), Bytes::from_static(b"opaque tag")),
        ];

        for (timestamp, frame_type, payload) in cases {
            let packet = MediaPacket {
                timestamp,
                frame_type,
                payload,
            };
            assert_eq!(MediaPacket::demux(packet.to_bytes()).unwrap(), packet);
        }
    }

    #[test]
    fn test_timestamp_truncation() {
        let packet = MediaPacket::new(0x1_0000_0001, FrameType::Audio, Bytes::new());
        assert_eq!(packet.timestamp, 1);

        let packet = MediaPacket::new(-1, FrameType::Audio, Bytes::new());
        assert_eq!(packet.timestamp, u32::MAX);
    }

    #[test]
    fn test_too_short() {
        let err = MediaPacket::demux(Bytes::from_static(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, PacketError::TooShort { len: 3 }));

        // header alone is a valid packet with an empty payload
        let packet = MediaPacket::demux(Bytes::from_static(&[0, 0, 0, 9, 2])).unwrap();
        assert_eq!(packet.timestamp, 9);
        assert_eq!(packet.frame_type, FrameType::Audio);
        assert!(packet.payload.is_empty());
    }
}
