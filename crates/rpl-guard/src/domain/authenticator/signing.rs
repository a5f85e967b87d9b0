//! Response tag computation.
//!
//! The tag is `nonce XOR key`. This proves that the responder holds the shared
//! key at the time of the challenge; it is not a MAC and does not resist an
//! adversary who observes one challenge/response pair.

use crate::domain::Nonce;

/// Tag a responder returns for `nonce`.
pub fn sign_nonce(nonce: Nonce, key: u32) -> u32 {
    nonce ^ key
}

/// Whether `signature` is the correct tag for `nonce`.
pub fn verify_signature(nonce: Nonce, signature: u32, key: u32) -> bool {
    signature == sign_nonce(nonce, key)
}
