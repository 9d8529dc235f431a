//! The receiving half of a live session.

use bytes::Bytes;
use framelink_codec::{AudioDecoderConfig, VideoDecoderConfig};
use framelink_nal::length_prefixed_to_annex_b;
use framelink_packet::{FrameType, MediaPacket};
use framelink_wire::DecoderConfigs;

use crate::error::SessionError;

/// Video payloads arrive with 4-byte length prefixes.
const NAL_LENGTH_SIZE: usize = 4;

/// The decoder configurations received for this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// The video track configuration, if video is present.
    pub video: Option<VideoDecoderConfig>,
    /// The audio track configuration, if audio is present.
    pub audio: Option<AudioDecoderConfig>,
}

/// Which decoder a buffer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTrack {
    /// The video track.
    Video,
    /// The audio track.
    Audio,
}

/// One buffer ready to queue on a platform decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInput {
    /// The track to queue it on.
    pub track: MediaTrack,
    /// Milliseconds since the sender's session origin.
    pub timestamp_ms: u32,
    /// Whether this is a sync point. Always `false` for audio.
    pub key_frame: bool,
    /// The buffer contents. Video is re-framed Annex-B.
    pub payload: Bytes,
}

/// Turns received wire messages into decoder input.
///
/// Text messages are parsed as the configuration document; anything else on
/// the text channel is ignored as noise. Binary messages are demuxed into
/// media packets, with video payloads converted back from length-prefixed
/// to Annex-B framing. Packets arriving before a configuration are dropped.
#[derive(Debug, Default)]
pub struct ReceiveSession {
    config: Option<SessionConfig>,
}

impl ReceiveSession {
    /// Creates a session awaiting its configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The received configuration, once one has arrived.
    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    /// Feeds one text message.
    ///
    /// Returns the configuration when this message carried the first valid
    /// configuration document, `None` for noise and for duplicate
    /// documents. Malformed base64 inside a valid document is an error.
    pub fn on_text(&mut self, text: &str) -> Result<Option<&SessionConfig>, SessionError> {
        let Some(document) = DecoderConfigs::from_json(text) else {
            tracing::debug!("ignoring unrecognized text message");
            return Ok(None);
        };

        if self.config.is_some() {
            tracing::debug!("ignoring duplicate decoder configuration");
            return Ok(None);
        }

        let config = SessionConfig {
            video: document.video_config.as_ref().map(|c| c.to_record()).transpose()?,
            audio: document.audio_config.as_ref().map(|c| c.to_record()).transpose()?,
        };

        tracing::debug!(
            video = config.video.as_ref().map(|c| c.codec.as_str()),
            audio = config.audio.as_ref().map(|c| c.codec.as_str()),
            "received decoder configuration"
        );

        Ok(Some(self.config.insert(config)))
    }

    /// Feeds one binary message.
    ///
    /// Returns `None` for packets that arrive before the configuration and
    /// for unknown frame type tags; both are dropped with a log line.
    pub fn on_binary(&mut self, data: Bytes) -> Result<Option<DecodedInput>, SessionError> {
        if self.config.is_none() {
            tracing::warn!("dropping media packet received before configuration");
            return Ok(None);
        }

        let packet = MediaPacket::demux(data)?;

        let input = match packet.frame_type {
            FrameType::VideoKeyFrame | FrameType::VideoInterFrame => DecodedInput {
                track: MediaTrack::Video,
                timestamp_ms: packet.timestamp,
                key_frame: packet.frame_type == FrameType::VideoKeyFrame,
                payload: Bytes::from(length_prefixed_to_annex_b(&packet.payload, NAL_LENGTH_SIZE)),
            },
            FrameType::Audio => DecodedInput {
                track: MediaTrack::Audio,
                timestamp_ms: packet.timestamp,
                key_frame: false,
                payload: packet.payload,
            },
            other => {
                tracing::warn!(tag = u8::from(other), "dropping packet with unknown frame type");
                return Ok(None);
            }
        };

        Ok(Some(input))
    }
}
