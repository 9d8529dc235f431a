//! The sending half of a live session.

use bytes::Bytes;
use framelink_codec::{AudioCodec, AudioDecoderConfig, VideoCodec, VideoDecoderConfig};
use framelink_nal::{NalUnits, annex_b_to_length_prefixed};
use framelink_packet::{FrameType, MediaPacket};
use framelink_wire::{AudioConfig, DecoderConfigs, VideoConfig};

use crate::error::SessionError;
use crate::timestamp::TimestampNormalizer;

/// NAL unit type of an AVC sequence parameter set.
const AVC_NAL_SPS: u8 = 7;
/// NAL unit type of an AVC picture parameter set.
const AVC_NAL_PPS: u8 = 8;

/// Static parameters of the video track being sent.
#[derive(Debug, Clone, Copy)]
pub struct VideoTrack {
    /// The codec the encoder produces.
    pub codec: VideoCodec,
    /// Coded frame width in pixels.
    pub coded_width: u32,
    /// Coded frame height in pixels.
    pub coded_height: u32,
    /// Nominal frame rate.
    pub frame_rate: u32,
    /// Profile idc from the encoder's output format, when it exposes one.
    /// Only consulted for the HEVC fallback codec string; the derived path
    /// reads the profile out of the VPS instead.
    pub profile: Option<u32>,
    /// Level idc from the encoder's output format, when it exposes one.
    pub level: Option<u32>,
}

/// Static parameters of the audio track being sent.
#[derive(Debug, Clone, Copy)]
pub struct AudioTrack {
    /// The codec the encoder produces.
    pub codec: AudioCodec,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channel_count: u32,
}

/// One buffer dequeued from a platform encoder.
#[derive(Debug, Clone)]
pub struct EncoderOutput {
    /// The buffer contents. For video this is Annex-B framed.
    pub payload: Bytes,
    /// Presentation timestamp in microseconds, on the encoder's clock.
    pub pts_us: i64,
    /// Whether this buffer carries codec-specific data instead of media.
    pub codec_config: bool,
    /// Whether this buffer is a sync point. Ignored for audio.
    pub key_frame: bool,
}

/// A message the caller must put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutput {
    /// The configuration document, sent as a text message.
    Config(String),
    /// A muxed media packet, sent as a binary message.
    Packet(Bytes),
}

/// Turns encoder outputs into wire messages.
///
/// The session gates all media behind the configuration document: it
/// collects codec-specific data from each expected track, publishes the
/// document exactly once when every track has reported, and drops media
/// frames dequeued before that point. Video payloads are converted from
/// Annex-B to length-prefixed framing on the way out.
///
/// Both tracks share one [`TimestampNormalizer`], so their packet
/// timestamps are on a common session clock.
#[derive(Debug)]
pub struct SendSession {
    video: VideoTrack,
    audio: Option<AudioTrack>,
    video_config: Option<VideoDecoderConfig>,
    audio_config: Option<AudioDecoderConfig>,
    config_sent: bool,
    timestamps: TimestampNormalizer,
}

impl SendSession {
    /// Creates a session for the given tracks.
    ///
    /// When `audio` is `None` the configuration is published as soon as the
    /// video codec-specific data arrives; otherwise it waits for both
    /// tracks.
    pub fn new(video: VideoTrack, audio: Option<AudioTrack>) -> Self {
        Self {
            video,
            audio,
            video_config: None,
            audio_config: None,
            config_sent: false,
            timestamps: TimestampNormalizer::new(),
        }
    }

    /// Whether the configuration document has been published.
    pub fn config_sent(&self) -> bool {
        self.config_sent
    }

    /// Feeds one video encoder output.
    pub fn on_video(&mut self, output: EncoderOutput) -> Result<Vec<SessionOutput>, SessionError> {
        if output.codec_config {
            if self.config_sent {
                tracing::debug!("ignoring codec config after configuration was published");
                return Ok(Vec::new());
            }

            self.video_config = match self.build_video_config(&output.payload)? {
                Some(config) => Some(config),
                None => return Ok(Vec::new()),
            };
            return Ok(self.maybe_publish());
        }

        if !self.config_sent {
            tracing::debug!("dropping video frame dequeued before configuration");
            return Ok(Vec::new());
        }

        let frame_type = if output.key_frame {
            FrameType::VideoKeyFrame
        } else {
            FrameType::VideoInterFrame
        };
        let payload = Bytes::from(annex_b_to_length_prefixed(&output.payload));

        Ok(vec![self.packet(output.pts_us, frame_type, payload)])
    }

    /// Feeds one audio encoder output.
    pub fn on_audio(&mut self, output: EncoderOutput) -> Result<Vec<SessionOutput>, SessionError> {
        let Some(track) = self.audio else {
            tracing::warn!("dropping audio output on a video-only session");
            return Ok(Vec::new());
        };

        if output.codec_config {
            if self.config_sent {
                tracing::debug!("ignoring codec config after configuration was published");
                return Ok(Vec::new());
            }

            self.audio_config = Some(build_audio_config(track, &output.payload)?);
            return Ok(self.maybe_publish());
        }

        if !self.config_sent {
            tracing::debug!("dropping audio frame dequeued before configuration");
            return Ok(Vec::new());
        }

        Ok(vec![self.packet(output.pts_us, FrameType::Audio, output.payload)])
    }

    fn build_video_config(&self, csd: &[u8]) -> Result<Option<VideoDecoderConfig>, SessionError> {
        let VideoTrack {
            codec,
            coded_width,
            coded_height,
            frame_rate,
            profile,
            level,
        } = self.video;

        match codec {
            VideoCodec::Avc => {
                let mut sps = None;
                let mut pps = None;
                for unit in NalUnits::new(csd) {
                    match unit.first().map(|b| b & 0x1F) {
                        Some(AVC_NAL_SPS) => sps = Some(Bytes::copy_from_slice(unit)),
                        Some(AVC_NAL_PPS) => pps = Some(Bytes::copy_from_slice(unit)),
                        _ => {}
                    }
                }

                let (Some(sps), Some(pps)) = (sps, pps) else {
                    tracing::warn!("codec config without both SPS and PPS, waiting for the next one");
                    return Ok(None);
                };

                Ok(Some(VideoDecoderConfig::avc(sps, pps, coded_width, coded_height, frame_rate)))
            }
            VideoCodec::Hevc => Ok(Some(VideoDecoderConfig::hevc(
                Bytes::copy_from_slice(csd),
                coded_width,
                coded_height,
                frame_rate,
                profile,
                level,
            ))),
            other => Err(SessionError::UnsupportedVideoCodec(other)),
        }
    }

    /// Publishes the configuration document once every expected track has
    /// reported its codec-specific data.
    fn maybe_publish(&mut self) -> Vec<SessionOutput> {
        if self.config_sent || self.video_config.is_none() {
            return Vec::new();
        }
        if self.audio.is_some() && self.audio_config.is_none() {
            return Vec::new();
        }

        let document = DecoderConfigs::new(
            self.video_config.as_ref().map(VideoConfig::from_record),
            self.audio_config.as_ref().map(AudioConfig::from_record),
        );

        match document.to_json() {
            Ok(json) => {
                self.config_sent = true;
                tracing::debug!("publishing decoder configuration");
                vec![SessionOutput::Config(json)]
            }
            Err(err) => {
                tracing::warn!(%err, "failed to serialize decoder configuration");
                Vec::new()
            }
        }
    }

    fn packet(&mut self, pts_us: i64, frame_type: FrameType, payload: Bytes) -> SessionOutput {
        let timestamp = self.timestamps.normalize(pts_us);
        let packet = MediaPacket::new(timestamp.millis, frame_type, payload);
        SessionOutput::Packet(packet.to_bytes())
    }
}

fn build_audio_config(track: AudioTrack, csd: &[u8]) -> Result<AudioDecoderConfig, SessionError> {
    match track.codec {
        AudioCodec::Aac => {
            Ok(AudioDecoderConfig::aac(Bytes::copy_from_slice(csd), track.sample_rate, track.channel_count)?)
        }
        AudioCodec::Opus => Ok(AudioDecoderConfig::opus(csd, track.sample_rate, track.channel_count).unwrap_or_else(|| {
            tracing::debug!("no OpusHead in codec specific data, synthesizing one");
            AudioDecoderConfig::opus_synthesized(track.sample_rate, track.channel_count)
        })),
        other => Err(SessionError::UnsupportedAudioCodec(other)),
    }
}
