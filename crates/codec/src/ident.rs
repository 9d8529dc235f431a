//! Codec identifiers: RFC 6381 codec-string prefixes and the MIME types the
//! platform codec factory is keyed by.

use crate::error::CodecError;

/// A video codec, identified by its codec-string prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// H.264 / AVC (`avc1`).
    Avc,
    /// H.265 / HEVC (`hev1`, `hvc1`).
    Hevc,
    /// VP8 (`vp08`).
    Vp8,
    /// VP9 (`vp09`).
    Vp9,
    /// AV1 (`av01`).
    Av1,
}

impl VideoCodec {
    /// Maps an RFC 6381 codec string to a codec by prefix.
    ///
    /// An unrecognized prefix is a hard configuration error: the session
    /// cannot pick a decoder for a stream it cannot identify.
    pub fn from_codec_string(codec: &str) -> Result<Self, CodecError> {
        if codec.starts_with("avc1") {
            Ok(Self::Avc)
        } else if codec.starts_with("hev1") || codec.starts_with("hvc1") {
            Ok(Self::Hevc)
        } else if codec.starts_with("vp09") {
            Ok(Self::Vp9)
        } else if codec.starts_with("vp08") {
            Ok(Self::Vp8)
        } else if codec.starts_with("av01") {
            Ok(Self::Av1)
        } else {
            Err(CodecError::UnsupportedCodec(codec.to_owned()))
        }
    }

    /// The MIME type the platform decoder factory expects.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Avc => "video/avc",
            Self::Hevc => "video/hevc",
            Self::Vp9 => "video/x-vnd.on2.vp9",
            Self::Vp8 => "video/x-vnd.on2.vp8",
            Self::Av1 => "video/av01",
        }
    }
}

/// An audio codec, identified by its codec-string prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    /// AAC (`mp4a`).
    Aac,
    /// Opus (`opus`).
    Opus,
    /// Vorbis (`vorbis`).
    Vorbis,
}

impl AudioCodec {
    /// Maps an RFC 6381 codec string to a codec by prefix.
    pub fn from_codec_string(codec: &str) -> Result<Self, CodecError> {
        if codec.starts_with("mp4a") {
            Ok(Self::Aac)
        } else if codec.starts_with("opus") {
            Ok(Self::Opus)
        } else if codec.starts_with("vorbis") {
            Ok(Self::Vorbis)
        } else {
            Err(CodecError::UnsupportedCodec(codec.to_owned()))
        }
    }

    /// The MIME type the platform decoder factory expects.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Aac => "audio/mp4a-latm",
            Self::Opus => "audio/opus",
            Self::Vorbis => "audio/vorbis",
        }
    }
}
