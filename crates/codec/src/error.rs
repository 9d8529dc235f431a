//! Error types.

/// Error type for configuration building and parsing.
///
/// Any of these poisons the whole record: a decoder configuration is built
/// once and trusted for the session, so a partial result is never returned.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// IO error (cursor underrun while parsing a record).
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// The codec string prefix maps to no known codec.
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),
    /// The record declares a parameter-set count this layout cannot carry.
    #[error("unsupported {kind} count: {count}")]
    UnsupportedParameterSetCount {
        /// Which parameter set ("sps" or "pps").
        kind: &'static str,
        /// The declared count.
        count: u8,
    },
    /// The AudioSpecificConfig is too short to carry an object type.
    #[error("audio specific config too short: {0} bytes")]
    AudioSpecificConfigTooShort(usize),
}
