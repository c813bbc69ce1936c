use std::fmt;
use std::str::FromStr;

use crate::{Result, VerificationError};

/// Raw SHA-256 digest length in bytes.
pub const SHA256_DIGEST_LEN: usize = 32;

/// Hex-encoded SHA-256 digest length in characters.
pub const SHA256_HEX_LEN: usize = SHA256_DIGEST_LEN * 2;

/// A raw SHA-256 digest.
///
/// Displays as 64 lowercase hex characters. Parsing is strict: uppercase or
/// short input is rejected, matching how digests are recorded in package
/// metadata.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; SHA256_DIGEST_LEN]);

impl Sha256Digest {
    pub const fn from_bytes(bytes: [u8; SHA256_DIGEST_LEN]) -> Self { Self(bytes) }

    pub fn as_bytes(&self) -> &[u8; SHA256_DIGEST_LEN] { &self.0 }

    pub fn to_hex(&self) -> String { hex_encode(&self.0) }

    pub fn matches_hex(&self, expected: &str) -> bool { hex_equals(expected, &self.0) }
}

impl From<[u8; SHA256_DIGEST_LEN]> for Sha256Digest {
    fn from(bytes: [u8; SHA256_DIGEST_LEN]) -> Self { Self(bytes) }
}

impl TryFrom<&[u8]> for Sha256Digest {
    type Error = VerificationError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        <[u8; SHA256_DIGEST_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| VerificationError::InvalidDigestLength(bytes.len()))
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_hex()) }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}

impl FromStr for Sha256Digest {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != SHA256_HEX_LEN {
            return Err(VerificationError::InvalidHexLength(s.len()));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(VerificationError::InvalidHex(s.to_string()));
        }
        let mut bytes = [0u8; SHA256_DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| VerificationError::InvalidHex(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// Lowercase hex, high nibble first.
pub fn hex_encode(digest: &[u8]) -> String { hex::encode(digest) }

/// Compare an expected hex digest against a raw SHA-256 digest.
///
/// Returns `false` on any length violation. Not constant-time.
pub fn hex_equals(expected: &str, digest: &[u8]) -> bool {
    match compare_hex(expected, digest) {
        Ok(equal) => equal,
        Err(err) => {
            tracing::debug!(%err, "malformed digest treated as mismatch");
            false
        }
    }
}

/// Like [`hex_equals`], but reports length violations as errors.
///
/// Walks `expected` two characters per digest byte without encoding
/// `digest` first.
pub fn compare_hex(expected: &str, digest: &[u8]) -> Result<bool> {
    if expected.len() != SHA256_HEX_LEN {
        return Err(VerificationError::InvalidHexLength(expected.len()));
    }
    if digest.len() != SHA256_DIGEST_LEN {
        return Err(VerificationError::InvalidDigestLength(digest.len()));
    }

    Ok(expected
        .as_bytes()
        .chunks_exact(2)
        .zip(digest)
        .all(|(pair, &byte)| pair[0] == nibble(byte >> 4) && pair[1] == nibble(byte & 0x0f)))
}

fn nibble(value: u8) -> u8 {
    if value < 10 { b'0' + value } else { b'a' + value - 10 }
}
