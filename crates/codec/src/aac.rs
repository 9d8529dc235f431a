//! Partial AudioSpecificConfig (ISO/IEC 14496-3) parsing.
//!
//! The decoder description for AAC is the ASC verbatim; the only thing built
//! from it is the `mp4a.40.<object type>` codec string, which needs the
//! leading bit fields of the config.

use crate::error::CodecError;

/// Minimal bit reader over a byte slice, MSB first.
struct BitCursor<'a> {
    data: &'a [u8],
    bit: usize,
}

impl<'a> BitCursor<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, bit: 0 }
    }

    fn read_bits(&mut self, count: usize) -> Option<u32> {
        if self.bit + count > self.data.len() * 8 {
            return None;
        }

        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.data[self.bit / 8];
            let shift = 7 - (self.bit % 8);
            value = (value << 1) | ((byte >> shift) & 1) as u32;
            self.bit += 1;
        }
        Some(value)
    }
}

/// The leading fields of an AudioSpecificConfig.
///
/// Only the fields needed to identify the stream are parsed; the rest of the
/// config stays opaque inside the description bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialAudioSpecificConfig {
    /// The MPEG-4 audio object type (2 = AAC-LC). The escape value 31
    /// extends the range by a further 6 bits.
    pub audio_object_type: u8,
    /// The sampling frequency in Hz, explicit or via the frequency index.
    pub sampling_frequency: Option<u32>,
    /// The channel configuration (0 = signalled elsewhere).
    pub channel_configuration: Option<u8>,
}

/// Sampling frequencies by index (ISO/IEC 14496-3, Table 1.18).
const SAMPLING_FREQUENCIES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

impl PartialAudioSpecificConfig {
    /// Parses the leading fields of an AudioSpecificConfig.
    ///
    /// A config too short to carry the object type fails; missing frequency
    /// or channel bits merely leave those fields unset, since the codec
    /// string needs the object type alone.
    pub fn parse(data: &[u8]) -> Result<Self, CodecError> {
        let mut bits = BitCursor::new(data);

        let audio_object_type = match bits.read_bits(5) {
            Some(31) => match bits.read_bits(6) {
                Some(ext) => 32 + ext as u8,
                None => return Err(CodecError::AudioSpecificConfigTooShort(data.len())),
            },
            Some(aot) => aot as u8,
            None => return Err(CodecError::AudioSpecificConfigTooShort(data.len())),
        };

        let sampling_frequency = match bits.read_bits(4) {
            Some(0xF) => bits.read_bits(24),
            Some(index) => SAMPLING_FREQUENCIES.get(index as usize).copied(),
            None => None,
        };

        let channel_configuration = bits.read_bits(4).map(|c| c as u8);

        Ok(Self {
            audio_object_type,
            sampling_frequency,
            channel_configuration,
        })
    }

    /// The RFC 6381 codec string, e.g. `mp4a.40.2` for AAC-LC.
    pub fn codec_string(&self) -> String {
        format!("mp4a.40.{}", self.audio_object_type)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aac_lc() {
        // AAC-LC, 44.1 kHz, stereo: 00010 0100 0010 ...
        let config = PartialAudioSpecificConfig::parse(&[0x12, 0x10]).unwrap();

        insta::assert_debug_snapshot!(config, @r"
        PartialAudioSpecificConfig {
            audio_object_type: 2,
            sampling_frequency: Some(
                44100,
            ),
            channel_configuration: Some(
                2,
            ),
        }
        ");
        assert_eq!(config.codec_string(), "mp4a.40.2");
    }

    #[test]
    fn test_parse_he_aac() {
        // SBR (object type 5), 48 kHz, stereo
        let config = PartialAudioSpecificConfig::parse(&[0x29, 0x90]).unwrap();

        assert_eq!(config.audio_object_type, 5);
        assert_eq!(config.sampling_frequency, Some(48000));
        assert_eq!(config.codec_string(), "mp4a.40.5");
    }

    #[test]
    fn test_parse_escaped_object_type() {
        // 11111 (escape) 000010 -> 34
        let config = PartialAudioSpecificConfig::parse(&[0b11111000, 0b01000000]).unwrap();

        assert_eq!(config.audio_object_type, 34);
        assert_eq!(config.codec_string(), "mp4a.40.34");
    }

    #[test]
    fn test_empty_config_fails() {
        let err = PartialAudioSpecificConfig::parse(&[]).unwrap_err();
        assert!(matches!(err, CodecError::AudioSpecificConfigTooShort(0)));
    }

    #[test]
    fn test_object_type_alone_is_enough() {
        let config = PartialAudioSpecificConfig::parse(&[0x10]).unwrap();

        assert_eq!(config.audio_object_type, 2);
        assert_eq!(config.sampling_frequency, None);
        assert_eq!(config.channel_configuration, None);
    }
}
