//! The AVC (H.264) decoder configuration record, the `avcC` box payload of
//! ISO/IEC 14496-15.
//!
//! This layout carries exactly one SPS and one PPS, which is what a live
//! encoder session produces. Records declaring more parameter sets are
//! rejected on parse rather than truncated.

use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::{Buf, Bytes};
use framelink_nal::{START_CODE, strip_start_code};

use crate::error::CodecError;

/// Fallback profile indication (High) for an SPS too short to parse.
const DEFAULT_PROFILE_INDICATION: u8 = 0x64;
/// Fallback profile compatibility flags.
const DEFAULT_PROFILE_COMPATIBILITY: u8 = 0x00;
/// Fallback level indication (Level 4.0).
const DEFAULT_LEVEL_INDICATION: u8 = 0x28;

fn extract_bytes(reader: &mut io::Cursor<Bytes>, len: usize) -> io::Result<Bytes> {
    if reader.remaining() < len {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "not enough data"));
    }
    Ok(reader.copy_to_bytes(len))
}

/// The AVC (H.264) Decoder Configuration Record.
///
/// ISO/IEC 14496-15 - 5.3.2.1.2, restricted to one SPS and one PPS.
#[derive(Debug, Clone, PartialEq)]
pub struct AvcDecoderConfigurationRecord {
    /// The `profile_idc` byte from the SPS (aka AVCProfileIndication).
    pub profile_indication: u8,
    /// The constraint-flag byte from the SPS.
    pub profile_compatibility: u8,
    /// The `level_idc` byte from the SPS (aka AVCLevelIndication).
    pub level_indication: u8,
    /// Length of the NAL unit length field minus one. Always 3 on the build
    /// path (4-byte lengths); preserved as parsed on the parse path.
    pub length_size_minus_one: u8,
    /// The SPS bytes, without a start code.
    pub sps: Bytes,
    /// The PPS bytes, without a start code.
    pub pps: Bytes,
}

impl AvcDecoderConfigurationRecord {
    /// Builds a record from raw encoder parameter sets.
    ///
    /// Leading start codes are stripped. Profile, compatibility and level are
    /// read from SPS bytes 1..4; an SPS shorter than 4 bytes falls back to
    /// High profile, Level 4.0 rather than failing, since a decoder can still
    /// be initialized from the parameter-set bytes themselves.
    pub fn from_parameter_sets(sps: Bytes, pps: Bytes) -> Self {
        let sps = sps.slice(sps.len() - strip_start_code(&sps).len()..);
        let pps = pps.slice(pps.len() - strip_start_code(&pps).len()..);

        let (profile_indication, profile_compatibility, level_indication) = if sps.len() >= 4 {
            (sps[1], sps[2], sps[3])
        } else {
            (
                DEFAULT_PROFILE_INDICATION,
                DEFAULT_PROFILE_COMPATIBILITY,
                DEFAULT_LEVEL_INDICATION,
            )
        };

        Self {
            profile_indication,
            profile_compatibility,
            level_indication,
            length_size_minus_one: 3,
            sps,
            pps,
        }
    }

    /// Parses a record from a byte stream.
    ///
    /// Fails with a typed error on any length running past the end of the
    /// buffer or on parameter-set counts other than one.
    pub fn parse(reader: &mut io::Cursor<Bytes>) -> Result<Self, CodecError> {
        // configuration_version, fixed at 1
        reader.read_u8()?;
        let profile_indication = reader.read_u8()?;
        let profile_compatibility = reader.read_u8()?;
        let level_indication = reader.read_u8()?;
        let length_size_minus_one = reader.read_u8()? & 0b00000011;

        let num_of_sequence_parameter_sets = reader.read_u8()? & 0b00011111;
        if num_of_sequence_parameter_sets != 1 {
            return Err(CodecError::UnsupportedParameterSetCount {
                kind: "sps",
                count: num_of_sequence_parameter_sets,
            });
        }
        let sps_length = reader.read_u16::<BigEndian>()?;
        let sps = extract_bytes(reader, sps_length as usize)?;

        let num_of_picture_parameter_sets = reader.read_u8()?;
        if num_of_picture_parameter_sets != 1 {
            return Err(CodecError::UnsupportedParameterSetCount {
                kind: "pps",
                count: num_of_picture_parameter_sets,
            });
        }
        let pps_length = reader.read_u16::<BigEndian>()?;
        let pps = extract_bytes(reader, pps_length as usize)?;

        Ok(Self {
            profile_indication,
            profile_compatibility,
            level_indication,
            length_size_minus_one,
            sps,
            pps,
        })
    }

    /// Returns the total byte size of the serialized record.
    pub fn size(&self) -> usize {
        1 // configuration_version
        + 1 // profile_indication
        + 1 // profile_compatibility
        + 1 // level_indication
        + 1 // reserved + length_size_minus_one
        + 1 // reserved + num_of_sequence_parameter_sets
        + 2 + self.sps.len()
        + 1 // num_of_picture_parameter_sets
        + 2 + self.pps.len()
    }

    /// Serializes the record into a byte stream.
    pub fn build<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(1)?; // configuration_version
        writer.write_u8(self.profile_indication)?;
        writer.write_u8(self.profile_compatibility)?;
        writer.write_u8(self.level_indication)?;
        // 6 bits reserved (all 1) + length_size_minus_one
        writer.write_u8(0b11111100 | (self.length_size_minus_one & 0b00000011))?;

        // 3 bits reserved (all 1) + num_of_sequence_parameter_sets = 1
        writer.write_u8(0b11100001)?;
        writer.write_u16::<BigEndian>(self.sps.len() as u16)?;
        writer.write_all(&self.sps)?;

        writer.write_u8(1)?; // num_of_picture_parameter_sets
        writer.write_u16::<BigEndian>(self.pps.len() as u16)?;
        writer.write_all(&self.pps)?;

        Ok(())
    }

    /// Serializes the record to an owned buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.size());
        // writing to a Vec cannot fail
        self.build(&mut buf).expect("infallible write");
        Bytes::from(buf)
    }

    /// The RFC 6381 codec string, e.g. `avc1.640028`.
    pub fn codec_string(&self) -> String {
        format!(
            "avc1.{:02x}{:02x}{:02x}",
            self.profile_indication, self.profile_compatibility, self.level_indication
        )
    }

    /// The SPS re-framed with a 4-byte Annex-B start code.
    ///
    /// Platform decoders take their parameter sets Annex-B framed even though
    /// the record stores them length-prefixed.
    pub fn annex_b_sps(&self) -> Bytes {
        annex_b(&self.sps)
    }

    /// The PPS re-framed with a 4-byte Annex-B start code.
    pub fn annex_b_pps(&self) -> Bytes {
        annex_b(&self.pps)
    }
}

fn annex_b(unit: &Bytes) -> Bytes {
    let mut buf = Vec::with_capacity(START_CODE.len() + unit.len());
    buf.extend_from_slice(&START_CODE);
    buf.extend_from_slice(unit);
    Bytes::from(buf)
}
