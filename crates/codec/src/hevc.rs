//! HEVC (H.265) codec string derivation.
//!
//! The decoder description for HEVC is the encoder's Annex-B VPS+SPS+PPS
//! blob handed through opaquely; what this module derives is the RFC 6381 /
//! ISO/IEC 14496-15 Annex E codec string (`hev1.1.6.L93.b0` and friends)
//! from the `profile_tier_level` structure at the head of the VPS.

use framelink_nal::NalUnits;

/// The `nal_unit_type` of a VPS (ISO/IEC 23008-2, Table 7-1).
const NAL_UNIT_TYPE_VPS: u8 = 32;

/// Byte length of the VPS prefix before `profile_tier_level`: 2-byte NAL
/// unit header plus 32 bits of VPS fields.
const PROFILE_TIER_LEVEL_OFFSET: usize = 6;

/// The fixed portion of `profile_tier_level` (ISO/IEC 23008-2, 7.3.3).
///
/// All fields here are byte-aligned within the VPS, so no bit reader is
/// needed beyond shifting the first byte apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTierLevel {
    /// `general_profile_space`, 2 bits.
    pub general_profile_space: u8,
    /// `general_tier_flag`.
    pub general_tier_flag: bool,
    /// `general_profile_idc`, 5 bits.
    pub general_profile_idc: u8,
    /// `general_profile_compatibility_flags`, 32 bits.
    pub general_profile_compatibility_flags: u32,
    /// `general_constraint_indicator_flags`, 48 bits.
    pub general_constraint_indicator_flags: u64,
    /// `general_level_idc`.
    pub general_level_idc: u8,
}

impl ProfileTierLevel {
    /// Parses the structure from a start-code-stripped VPS NAL unit.
    ///
    /// Returns `None` when the unit is not a VPS or is too short to carry the
    /// fixed portion of `profile_tier_level`.
    pub fn parse_from_vps(vps: &[u8]) -> Option<Self> {
        if vps.is_empty() || (vps[0] >> 1) & 0b00111111 != NAL_UNIT_TYPE_VPS {
            return None;
        }

        // ISO/IEC 23008-2 - 7.3.1.1: undo emulation prevention
        // (`00 00 03` -> `00 00`) before reading any field. The zero runs of
        // the compatibility and constraint flags are escaped in real encoder
        // output, so reading the raw bytes would shift every field after
        // them.
        let mut rbsp = Vec::with_capacity(vps.len());
        let mut i = 0;
        while i < vps.len() {
            if i + 2 < vps.len() && vps[i] == 0x00 && vps[i + 1] == 0x00 && vps[i + 2] == 0x03 {
                rbsp.push(0x00);
                rbsp.push(0x00);
                i += 3; // Skip the emulation prevention byte.
            } else {
                rbsp.push(vps[i]);
                i += 1;
            }
        }

        if rbsp.len() < PROFILE_TIER_LEVEL_OFFSET + 12 {
            return None;
        }

        let ptl = &rbsp[PROFILE_TIER_LEVEL_OFFSET..];
        let compatibility = u32::from_be_bytes([ptl[1], ptl[2], ptl[3], ptl[4]]);
        let constraints = u64::from_be_bytes([0, 0, ptl[5], ptl[6], ptl[7], ptl[8], ptl[9], ptl[10]]);

        Some(Self {
            general_profile_space: ptl[0] >> 6,
            general_tier_flag: ptl[0] & 0b00100000 != 0,
            general_profile_idc: ptl[0] & 0b00011111,
            general_profile_compatibility_flags: compatibility,
            general_constraint_indicator_flags: constraints,
            general_level_idc: ptl[11],
        })
    }

    /// The RFC 6381 codec string for this profile/tier/level, with a `hev1.`
    /// sample-entry prefix.
    ///
    /// Per ISO/IEC 14496-15 Annex E: profile space as `A`/`B`/`C` (empty for
    /// space 0), profile idc in decimal, the compatibility flag word with
    /// reversed bit order in hex, `L`/`H` tier plus level idc in decimal, and
    /// the constraint bytes in hex with trailing zero bytes trimmed (at least
    /// one byte is kept).
    pub fn codec_string(&self) -> String {
        let space = match self.general_profile_space {
            1 => "A",
            2 => "B",
            3 => "C",
            _ => "",
        };
        let tier = if self.general_tier_flag { 'H' } else { 'L' };
        let compatibility = self.general_profile_compatibility_flags.reverse_bits();

        let constraint_bytes = self.general_constraint_indicator_flags.to_be_bytes();
        let mut constraints = &constraint_bytes[2..];
        while constraints.len() > 1 && constraints[constraints.len() - 1] == 0 {
            constraints = &constraints[..constraints.len() - 1];
        }
        let constraints = constraints.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(".");

        format!(
            "hev1.{space}{}.{compatibility:x}.{tier}{}.{constraints}",
            self.general_profile_idc, self.general_level_idc
        )
    }
}

/// Derives the codec string from an Annex-B VPS+SPS+PPS description blob.
///
/// Scans the blob for a VPS unit and reads its `profile_tier_level`. Returns
/// `None` when no parsable VPS is present; callers fall back to
/// [`legacy_codec_string`].
pub fn codec_string_from_description(description: &[u8]) -> Option<String> {
    NalUnits::new(description)
        .filter(|unit| !unit.is_empty())
        .find_map(ProfileTierLevel::parse_from_vps)
        .map(|ptl| ptl.codec_string())
}

/// The fixed-placeholder codec string shape older senders emit
/// (`hev1.<profile>.06.L<level>.b0`).
///
/// Used only when the description carries no parsable VPS; the flag and tier
/// fields are not derived from the stream.
pub fn legacy_codec_string(profile: u32, level: u32) -> String {
    format!("hev1.{profile}.06.L{level}.b0")
}

/// Default profile idc (Main) when the encoder format exposes none.
pub const DEFAULT_PROFILE: u32 = 1;
/// Default level idc (Level 3.1) when the encoder format exposes none.
pub const DEFAULT_LEVEL: u32 = 93;

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    // Main profile, Main tier, Level 3.1 VPS as a hardware encoder emits it.
    const VPS: &[u8] = &[
        0x40, 0x01, // nal_unit_header, type 32
        0x0C, 0x01, 0xFF, 0xFF, // vps fields
        0x01, // space 0, tier 0, profile_idc 1
        0x60, 0x00, 0x00, 0x00, // compatibility flags
        0x90, 0x00, 0x00, 0x00, 0x00, 0x00, // constraint flags
        0x5D, // level_idc 93
        0x95, 0x98, 0x09, // remainder of the vps
    ];

    #[test]
    fn test_parse_profile_tier_level() {
        let ptl = ProfileTierLevel::parse_from_vps(VPS).unwrap();

        insta::assert_debug_snapshot!(ptl, @r"
        ProfileTierLevel {
            general_profile_space: 0,
            general_tier_flag: false,
            general_profile_idc: 1,
            general_profile_compatibility_flags: 1610612736,
            general_constraint_indicator_flags: 158329674399744,
            general_level_idc: 93,
        }
        ");
    }

    #[test]
    fn test_codec_string() {
        let ptl = ProfileTierLevel::parse_from_vps(VPS).unwrap();
        assert_eq!(ptl.codec_string(), "hev1.1.6.L93.90");
    }

    #[test]
    fn test_emulation_prevention_bytes_are_removed() {
        // Same Main/L93 profile_tier_level as VPS above, but with the zero
        // runs escaped as `00 00 03` the way encoders actually emit it.
        let escaped: &[u8] = &[
            0x40, 0x01, // nal_unit_header, type 32
            0x0C, 0x01, 0xFF, 0xFF, // vps fields
            0x01, // space 0, tier 0, profile_idc 1
            0x60, 0x00, 0x00, 0x03, 0x00, // compatibility flags, escaped
            0x90, 0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x00, // constraint flags, escaped
            0x5D, // level_idc 93
        ];

        let ptl = ProfileTierLevel::parse_from_vps(escaped).unwrap();
        assert_eq!(ptl, ProfileTierLevel::parse_from_vps(VPS).unwrap());
        assert_eq!(ptl.codec_string(), "hev1.1.6.L93.90");
    }

    #[test]
    fn test_codec_string_high_tier_keeps_constraint_tail() {
        let ptl = ProfileTierLevel {
            general_profile_space: 0,
            general_tier_flag: true,
            general_profile_idc: 2,
            general_profile_compatibility_flags: 0x4000_0000,
            general_constraint_indicator_flags: 0x9000_0000_0800,
            general_level_idc: 120,
        };

        assert_eq!(ptl.codec_string(), "hev1.2.2.H120.90.00.00.00.08");
    }

    #[test]
    fn test_codec_string_from_description() {
        let mut description = vec![0x00, 0x00, 0x00, 0x01];
        description.extend_from_slice(VPS);
        // an SPS after the VPS does not confuse the scan
        description.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x01]);

        assert_eq!(codec_string_from_description(&description).as_deref(), Some("hev1.1.6.L93.90"));
    }

    #[test]
    fn test_description_without_vps() {
        // SPS-only blob (nal_unit_type 33)
        let description = [0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x01, 0x01, 0x60, 0x00];
        assert_eq!(codec_string_from_description(&description), None);
    }

    #[test]
    fn test_legacy_codec_string() {
        assert_eq!(legacy_codec_string(DEFAULT_PROFILE, DEFAULT_LEVEL), "hev1.1.06.L93.b0");
    }
}
