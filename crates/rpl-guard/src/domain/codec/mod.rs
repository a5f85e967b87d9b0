//! Advertisement Codec
//!
//! Text wire format shared by every node (and replayed verbatim by the
//! adversary):
//!
//! ```text
//! advertisement : "<senderId> <version> <rank> <counter>"
//! challenge     : "AUTH-REQ <nonce>"
//! response      : "AUTH-RESP <nonce> <signature>"
//! data          : "<srcId> <dstId> <payload-token>"
//! ```
//!
//! Fields are separated by ASCII whitespace. Inbound payloads are read up to
//! [`MAX_PAYLOAD_LEN`] bytes, up to the first invalid UTF-8 sequence, and
//! tokens beyond the last expected field are ignored.

use crate::domain::{Advertisement, CodecError, NodeId, Nonce};

/// Bytes of an inbound payload that are considered for decoding.
pub const MAX_PAYLOAD_LEN: usize = 127;

/// Maximum length of the application data token.
pub const MAX_DATA_TOKEN_LEN: usize = 63;

/// Tag opening a challenge.
pub const AUTH_REQUEST_TAG: &str = "AUTH-REQ";

/// Tag opening a challenge response.
pub const AUTH_RESPONSE_TAG: &str = "AUTH-RESP";

/// A message with a text wire representation.
pub trait WirePayload: Sized {
    /// Encode into datagram bytes.
    fn encode(&self) -> Vec<u8>;

    /// Decode from datagram bytes.
    fn decode(bytes: &[u8]) -> Result<Self, CodecError>;
}

/// Messages exchanged on the authentication channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMessage {
    /// `AUTH-REQ <nonce>`
    Challenge {
        /// Nonce to be signed
        nonce: Nonce,
    },
    /// `AUTH-RESP <nonce> <signature>`
    Response {
        /// Echoed nonce
        nonce: Nonce,
        /// `nonce XOR key`
        signature: u32,
    },
}

/// Application datagram forwarded hop by hop toward the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMessage {
    /// Originating node
    pub src_id: NodeId,
    /// Destination (0 is the root)
    pub dst_id: NodeId,
    /// Opaque single-token payload
    pub token: String,
}

impl DataMessage {
    /// Create a data message, truncating the token to [`MAX_DATA_TOKEN_LEN`] characters.
    pub fn new(src_id: NodeId, dst_id: NodeId, token: &str) -> Self {
        Self {
            src_id,
            dst_id,
            token: token.chars().take(MAX_DATA_TOKEN_LEN).collect(),
        }
    }
}

/// View the considered prefix of a payload as text.
///
/// Decoding stops at the first byte that is not valid UTF-8, so trailing
/// binary junk or a character cut at the length limit does not hide the
/// fields in front of it.
fn payload_text(bytes: &[u8]) -> Result<&str, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }
    let considered = &bytes[..bytes.len().min(MAX_PAYLOAD_LEN)];
    match std::str::from_utf8(considered) {
        Ok(text) => Ok(text),
        Err(e) if e.valid_up_to() == 0 => Err(CodecError::InvalidUtf8),
        Err(e) => std::str::from_utf8(&considered[..e.valid_up_to()])
            .map_err(|_| CodecError::InvalidUtf8),
    }
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<&'a str, CodecError> {
    fields.next().ok_or(CodecError::MissingField(name))
}

fn next_u32<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<u32, CodecError> {
    let raw = next_field(fields, name)?;
    // Reject signs explicitly; `u32::from_str` accepts a leading '+'.
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidNumber {
            field: name,
            value: raw.to_string(),
        });
    }
    raw.parse().map_err(|_| CodecError::InvalidNumber {
        field: name,
        value: raw.to_string(),
    })
}

impl WirePayload for Advertisement {
    fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut fields = payload_text(bytes)?.split_ascii_whitespace();
        Ok(Self {
            sender_id: next_u32(&mut fields, "sender_id")?,
            version: next_u32(&mut fields, "version")?,
            rank: next_u32(&mut fields, "rank")?,
            counter: next_u32(&mut fields, "counter")?,
        })
    }
}

impl WirePayload for AuthMessage {
    fn encode(&self) -> Vec<u8> {
        match self {
            Self::Challenge { nonce } => format!("{AUTH_REQUEST_TAG} {nonce}"),
            Self::Response { nonce, signature } => {
                format!("{AUTH_RESPONSE_TAG} {nonce} {signature}")
            }
        }
        .into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut fields = payload_text(bytes)?.split_ascii_whitespace();
        match next_field(&mut fields, "tag")? {
            AUTH_REQUEST_TAG => Ok(Self::Challenge {
                nonce: next_u32(&mut fields, "nonce")?,
            }),
            AUTH_RESPONSE_TAG => Ok(Self::Response {
                nonce: next_u32(&mut fields, "nonce")?,
                signature: next_u32(&mut fields, "signature")?,
            }),
            other => Err(CodecError::UnknownTag(other.to_string())),
        }
    }
}

impl WirePayload for DataMessage {
    fn encode(&self) -> Vec<u8> {
        format!("{} {} {}", self.src_id, self.dst_id, self.token).into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut fields = payload_text(bytes)?.split_ascii_whitespace();
        let src_id = next_u32(&mut fields, "src_id")?;
        let dst_id = next_u32(&mut fields, "dst_id")?;
        let token = next_field(&mut fields, "token")?;
        Ok(Self::new(src_id, dst_id, token))
    }
}
