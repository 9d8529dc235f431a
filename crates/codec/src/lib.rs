//! Decoder configuration records for the streams a mobile camera encoder
//! produces: AVC (H.264) and HEVC (H.265) video, AAC and Opus audio.
//!
//! The build path turns raw encoder output (SPS/PPS buffers, the VPS+SPS+PPS
//! blob, an AudioSpecificConfig, an `OpusHead`-carrying codec-specific-data
//! block) into a [`VideoDecoderConfig`] or [`AudioDecoderConfig`]: an RFC
//! 6381 codec string plus the description bytes an OS decoder consumes
//! verbatim as its codec-specific data. The parse path reverses it on the
//! receiving peer, splitting the description back into the per-unit parameter
//! sets a platform decoder expects.
//!
//! A configuration record is built once per encoding session and trusted for
//! the session's lifetime, so the parse path fails hard on any out-of-range
//! length instead of producing a silently corrupt record.
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

/// AAC AudioSpecificConfig parsing.
pub mod aac;
/// AVC decoder configuration record (`avcC`).
pub mod avc;
/// The decoder configuration record types.
pub mod config;
/// Error types.
pub mod error;
/// HEVC codec string derivation.
pub mod hevc;
/// Codec identifiers and codec-string / MIME mapping.
pub mod ident;
/// Opus identification header (`OpusHead`).
pub mod opus;

pub use self::aac::PartialAudioSpecificConfig;
pub use self::avc::AvcDecoderConfigurationRecord;
pub use self::config::{AudioDecoderConfig, VideoDecoderConfig, VideoParameterSets};
pub use self::error::CodecError;
pub use self::hevc::ProfileTierLevel;
pub use self::ident::{AudioCodec, VideoCodec};
pub use self::opus::OpusHead;
