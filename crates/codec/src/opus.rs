//! The Opus identification header (RFC 7845 `OpusHead`).
//!
//! Android's Opus encoder wraps its codec-specific data in vendor blocks
//! (`AOPUSHDR`, `AOPUSDLY`, `AOPUSPRL`); the real header is the 19-byte
//! window behind the first `OpusHead` magic. When the encoder emits no
//! usable block at all, a header can be synthesized from the known sample
//! rate and channel count.

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;

/// The 8-byte ASCII magic opening an `OpusHead` block.
pub const OPUS_HEAD_MAGIC: &[u8; 8] = b"OpusHead";

/// The fixed `OpusHead` length for channel mapping family 0.
pub const OPUS_HEAD_LEN: usize = 19;

/// Pre-skip in samples at 48 kHz (RFC 7845 recommends 3840; Android's
/// encoder uses 312).
const PRE_SKIP_48K: u64 = 312;

/// An `OpusHead` identification header, channel mapping family 0 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusHead {
    /// Header version, always 1.
    pub version: u8,
    /// Output channel count.
    pub channel_count: u8,
    /// Samples to discard at 48 kHz before playback starts.
    pub pre_skip: u16,
    /// Sample rate of the original input, in Hz. Informational; Opus always
    /// decodes at 48 kHz.
    pub input_sample_rate: u32,
    /// Output gain in Q7.8 dB.
    pub output_gain: i16,
    /// Channel mapping family (0 = mono/stereo).
    pub mapping_family: u8,
}

impl OpusHead {
    /// Extracts the header from an encoder codec-specific-data block.
    ///
    /// Finds the first `OpusHead` magic and parses the 19-byte window behind
    /// it, skipping any vendor blocks before it. Returns `None` when the
    /// magic is absent or fewer than 19 bytes remain after it; the caller
    /// may then [`synthesize`](Self::synthesize) a header instead.
    pub fn extract(csd: &[u8]) -> Option<Self> {
        let start = csd.windows(OPUS_HEAD_MAGIC.len()).position(|w| w == OPUS_HEAD_MAGIC)?;
        let head = csd.get(start..start + OPUS_HEAD_LEN)?;

        Some(Self {
            version: head[8],
            channel_count: head[9],
            pre_skip: u16::from_le_bytes([head[10], head[11]]),
            input_sample_rate: u32::from_le_bytes([head[12], head[13], head[14], head[15]]),
            output_gain: i16::from_le_bytes([head[16], head[17]]),
            mapping_family: head[18],
        })
    }

    /// Builds a header from a known sample rate and channel count, for
    /// encoders that emit no `OpusHead` block.
    ///
    /// Pre-skip is `round(312 * sample_rate / 48000)`, gain 0, mapping
    /// family 0.
    pub fn synthesize(sample_rate: u32, channel_count: u8) -> Self {
        let pre_skip = (PRE_SKIP_48K * sample_rate as u64 + 24000) / 48000;

        Self {
            version: 1,
            channel_count,
            pre_skip: pre_skip as u16,
            input_sample_rate: sample_rate,
            output_gain: 0,
            mapping_family: 0,
        }
    }

    /// Serializes the 19-byte header.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = Vec::with_capacity(OPUS_HEAD_LEN);
        buf.extend_from_slice(OPUS_HEAD_MAGIC);
        buf.push(self.version);
        buf.push(self.channel_count);
        // writing to a Vec cannot fail
        buf.write_u16::<LittleEndian>(self.pre_skip).expect("infallible write");
        buf.write_u32::<LittleEndian>(self.input_sample_rate).expect("infallible write");
        buf.write_i16::<LittleEndian>(self.output_gain).expect("infallible write");
        buf.push(self.mapping_family);
        Bytes::from(buf)
    }
}
