//! The decoder configuration records exchanged once per session.
//!
//! A record pairs an RFC 6381 codec string with the description bytes the
//! remote decoder consumes verbatim as codec-specific data. The build
//! constructors run on the encoding side; [`VideoDecoderConfig::parameter_sets`]
//! and [`AudioDecoderConfig::codec_specific_data`] run on the decoding side.

use std::io;

use bytes::Bytes;

use crate::aac::PartialAudioSpecificConfig;
use crate::avc::AvcDecoderConfigurationRecord;
use crate::error::CodecError;
use crate::hevc;
use crate::ident::{AudioCodec, VideoCodec};
use crate::opus::OpusHead;

/// Decode parameters for one video elementary stream.
///
/// Built once per encoding session, immediately after the encoder's first
/// codec-config output; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDecoderConfig {
    /// RFC 6381 codec string, e.g. `avc1.640028`.
    pub codec: String,
    /// Coded frame width in pixels.
    pub coded_width: u32,
    /// Coded frame height in pixels.
    pub coded_height: u32,
    /// Nominal frame rate.
    pub frame_rate: u32,
    /// Codec-specific description: the `avcC` box for AVC, the Annex-B
    /// VPS+SPS+PPS blob for HEVC. Never itself Annex-B framed for AVC.
    pub description: Bytes,
}

/// The per-unit parameter sets a platform video decoder is initialized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoParameterSets {
    /// AVC: SPS and PPS, each re-framed with a 4-byte Annex-B start code
    /// (csd-0 and csd-1).
    Avc {
        /// Annex-B framed SPS.
        sps: Bytes,
        /// Annex-B framed PPS.
        pps: Bytes,
    },
    /// Codecs whose description is handed through as csd-0 unchanged.
    Opaque(Bytes),
}

impl VideoDecoderConfig {
    /// Builds an AVC configuration from the encoder's SPS (csd-0) and PPS
    /// (csd-1) buffers. Start codes may be present; they are stripped.
    pub fn avc(sps: Bytes, pps: Bytes, coded_width: u32, coded_height: u32, frame_rate: u32) -> Self {
        let record = AvcDecoderConfigurationRecord::from_parameter_sets(sps, pps);

        Self {
            codec: record.codec_string(),
            coded_width,
            coded_height,
            frame_rate,
            description: record.to_bytes(),
        }
    }

    /// Builds an HEVC configuration from the encoder's VPS+SPS+PPS blob
    /// (csd-0), passed through opaquely.
    ///
    /// The codec string is derived from the VPS `profile_tier_level` when
    /// one can be parsed out of the blob; otherwise the legacy placeholder
    /// shape is built from the encoder format's profile/level, defaulting to
    /// Main profile, Level 3.1.
    pub fn hevc(
        description: Bytes,
        coded_width: u32,
        coded_height: u32,
        frame_rate: u32,
        profile: Option<u32>,
        level: Option<u32>,
    ) -> Self {
        let codec = hevc::codec_string_from_description(&description).unwrap_or_else(|| {
            hevc::legacy_codec_string(profile.unwrap_or(hevc::DEFAULT_PROFILE), level.unwrap_or(hevc::DEFAULT_LEVEL))
        });

        Self {
            codec,
            coded_width,
            coded_height,
            frame_rate,
            description,
        }
    }

    /// The video codec this configuration identifies.
    pub fn video_codec(&self) -> Result<VideoCodec, CodecError> {
        VideoCodec::from_codec_string(&self.codec)
    }

    /// Splits the description back into decoder parameter sets.
    ///
    /// For AVC the description is parsed as an `avcC` box and each parameter
    /// set is re-framed Annex-B; any malformed length fails the whole call.
    pub fn parameter_sets(&self) -> Result<VideoParameterSets, CodecError> {
        match self.video_codec()? {
            VideoCodec::Avc => {
                let record = AvcDecoderConfigurationRecord::parse(&mut io::Cursor::new(self.description.clone()))?;
                Ok(VideoParameterSets::Avc {
                    sps: record.annex_b_sps(),
                    pps: record.annex_b_pps(),
                })
            }
            _ => Ok(VideoParameterSets::Opaque(self.description.clone())),
        }
    }
}

/// Decode parameters for one audio elementary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDecoderConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channel_count: u32,
    /// RFC 6381 codec string, e.g. `mp4a.40.2` or `opus`.
    pub codec: String,
    /// Codec-specific description: the AudioSpecificConfig for AAC, the
    /// 19-byte `OpusHead` for Opus.
    pub description: Bytes,
}

impl AudioDecoderConfig {
    /// Builds an AAC configuration from the encoder's raw
    /// AudioSpecificConfig (csd-0), stored unmodified.
    ///
    /// The codec string carries the object type read from the config's
    /// leading bits, so a config too short to parse fails the build.
    pub fn aac(audio_specific_config: Bytes, sample_rate: u32, channel_count: u32) -> Result<Self, CodecError> {
        let parsed = PartialAudioSpecificConfig::parse(&audio_specific_config)?;

        Ok(Self {
            sample_rate,
            channel_count,
            codec: parsed.codec_string(),
            description: audio_specific_config,
        })
    }

    /// Builds an Opus configuration from the encoder's codec-specific-data
    /// block.
    ///
    /// Returns `None` when no `OpusHead` can be extracted; the caller may
    /// fall back to [`opus_synthesized`](Self::opus_synthesized).
    pub fn opus(csd: &[u8], sample_rate: u32, channel_count: u32) -> Option<Self> {
        let head = OpusHead::extract(csd)?;

        Some(Self {
            sample_rate,
            channel_count,
            codec: "opus".to_owned(),
            description: head.to_bytes(),
        })
    }

    /// Builds an Opus configuration with a synthesized `OpusHead`, for
    /// encoders that emit no usable codec-specific data.
    pub fn opus_synthesized(sample_rate: u32, channel_count: u32) -> Self {
        let head = OpusHead::synthesize(sample_rate, channel_count as u8);

        Self {
            sample_rate,
            channel_count,
            codec: "opus".to_owned(),
            description: head.to_bytes(),
        }
    }

    /// The audio codec this configuration identifies.
    pub fn audio_codec(&self) -> Result<AudioCodec, CodecError> {
        AudioCodec::from_codec_string(&self.codec)
    }

    /// The decoder's csd-0 buffer: the description verbatim.
    pub fn codec_specific_data(&self) -> Bytes {
        self.description.clone()
    }
}
