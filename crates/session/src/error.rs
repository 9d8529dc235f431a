//! Session error type.

use framelink_codec::CodecError;
use framelink_packet::PacketError;
use framelink_wire::WireError;

/// Errors that tear down a session.
///
/// Ignorable input (unparseable text messages, packets arriving before the
/// configuration) is not an error; the sessions drop it and log instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A decoder configuration could not be built or split.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),
    /// A binary message could not be demuxed.
    #[error("packet: {0}")]
    Packet(#[from] PacketError),
    /// The configuration document could not be serialized or its
    /// description fields decoded.
    #[error("wire: {0}")]
    Wire(#[from] WireError),
    /// A video codec this crate cannot package.
    #[error("unsupported video codec: {0:?}")]
    UnsupportedVideoCodec(framelink_codec::VideoCodec),
    /// An audio codec this crate cannot package.
    #[error("unsupported audio codec: {0:?}")]
    UnsupportedAudioCodec(framelink_codec::AudioCodec),
}
