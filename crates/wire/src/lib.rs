//! The JSON decoder-configuration document, sent as a single text message
//! before any binary media packet.
//!
//! The document carries base64-encoded description bytes so it can travel
//! over a text channel; [`VideoConfig`] / [`AudioConfig`] convert to and
//! from the binary record types in `framelink-codec`.
//!
//! Parsing is noise-tolerant by design: the text channel may carry other
//! messages, so anything that is not a well-formed document with the
//! `DecoderConfigs` type discriminator parses to `None` rather than an
//! error.
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

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use framelink_codec::{AudioDecoderConfig, VideoDecoderConfig};
use serde_derive::{Deserialize, Serialize};

/// The required value of the document's `type` field.
pub const DOCUMENT_TYPE: &str = "DecoderConfigs";

/// Error type for document serialization and record conversion.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// A description field is not valid base64.
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// The video half of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConfig {
    /// RFC 6381 codec string.
    pub codec: String,
    /// Coded frame width in pixels.
    pub coded_width: u32,
    /// Coded frame height in pixels.
    pub coded_height: u32,
    /// Nominal frame rate.
    pub frame_rate: u32,
    /// Base64 of the codec-specific description bytes.
    pub description: String,
}

impl VideoConfig {
    /// Converts a binary record into its wire form.
    pub fn from_record(record: &VideoDecoderConfig) -> Self {
        Self {
            codec: record.codec.clone(),
            coded_width: record.coded_width,
            coded_height: record.coded_height,
            frame_rate: record.frame_rate,
            description: BASE64.encode(&record.description),
        }
    }

    /// Converts the wire form back into a binary record.
    pub fn to_record(&self) -> Result<VideoDecoderConfig, WireError> {
        Ok(VideoDecoderConfig {
            codec: self.codec.clone(),
            coded_width: self.coded_width,
            coded_height: self.coded_height,
            frame_rate: self.frame_rate,
            description: Bytes::from(BASE64.decode(&self.description)?),
        })
    }
}

/// The audio half of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub number_of_channels: u32,
    /// RFC 6381 codec string.
    pub codec: String,
    /// Base64 of the codec-specific description bytes.
    pub description: String,
}

impl AudioConfig {
    /// Converts a binary record into its wire form.
    pub fn from_record(record: &AudioDecoderConfig) -> Self {
        Self {
            sample_rate: record.sample_rate,
            number_of_channels: record.channel_count,
            codec: record.codec.clone(),
            description: BASE64.encode(&record.description),
        }
    }

    /// Converts the wire form back into a binary record.
    pub fn to_record(&self) -> Result<AudioDecoderConfig, WireError> {
        Ok(AudioDecoderConfig {
            sample_rate: self.sample_rate,
            channel_count: self.number_of_channels,
            codec: self.codec.clone(),
            description: Bytes::from(BASE64.decode(&self.description)?),
        })
    }
}

/// The decoder-configuration document.
///
/// Either sub-object may be absent, meaning that media type is not part of
/// the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfigs {
    /// The type discriminator, always [`DOCUMENT_TYPE`].
    #[serde(rename = "type")]
    kind: String,
    /// The video stream configuration, if video is present.
    #[serde(rename = "videoConfig", default, skip_serializing_if = "Option::is_none")]
    pub video_config: Option<VideoConfig>,
    /// The audio stream configuration, if audio is present.
    #[serde(rename = "audioConfig", default, skip_serializing_if = "Option::is_none")]
    pub audio_config: Option<AudioConfig>,
}

impl DecoderConfigs {
    /// Creates a document with the correct type discriminator.
    pub fn new(video_config: Option<VideoConfig>, audio_config: Option<AudioConfig>) -> Self {
        Self {
            kind: DOCUMENT_TYPE.to_owned(),
            video_config,
            audio_config,
        }
    }

    /// Parses a document from a text message.
    ///
    /// Returns `None` for malformed JSON and for documents whose `type` is
    /// not exactly `DecoderConfigs`; such messages are ignorable noise, not
    /// session-fatal errors.
    pub fn from_json(text: &str) -> Option<Self> {
        let configs: Self = serde_json::from_str(text).ok()?;
        if configs.kind != DOCUMENT_TYPE {
            return None;
        }
        Some(configs)
    }

    /// Serializes the document to a JSON text message.
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}
