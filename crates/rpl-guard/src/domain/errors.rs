//! Domain Errors for Advertisement Processing
//!
//! Protocol outcomes such as "stale" or "distrusted" are not errors and are
//! reported through verdict enums. Only payloads that cannot be understood at
//! all surface as [`CodecError`].

use thiserror::Error;

/// Errors raised while decoding a wire payload.
///
/// Every variant leads to the datagram being silently discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Datagram carried no bytes
    #[error("empty payload")]
    Empty,
    /// Payload is not text
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
    /// Fewer whitespace-delimited fields than the message requires
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A numeric field did not parse as an unsigned 32-bit integer
    #[error("field `{field}` is not an unsigned integer: {value:?}")]
    InvalidNumber {
        /// Name of the offending field
        field: &'static str,
        /// Raw token as received
        value: String,
    },
    /// Authentication payload with an unrecognised leading tag
    #[error("unknown message tag {0:?}")]
    UnknownTag(String),
}
