use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use crate::{Result, Sha256Digest, Sha256Hasher, VerificationError, VerifiedReader, hex_equals};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug)]
pub struct HashOptions {
    chunk_size: usize,
}

impl Default for HashOptions {
    fn default() -> Self { Self::new() }
}

impl HashOptions {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Read buffer size. Clamped to at least one byte.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn get_chunk_size(&self) -> usize { self.chunk_size }
}

/// Result of checking a file against an expected digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
    Matched,
    Mismatched,
}

impl Check {
    pub fn is_match(self) -> bool { self == Self::Matched }
}

/// Stream `reader` to end of input through SHA-256.
pub fn hash_reader<R: Read>(reader: R, options: HashOptions) -> io::Result<Sha256Digest> {
    let mut verified = VerifiedReader::new(reader, Sha256Hasher::new());
    let mut buf = vec![0u8; options.get_chunk_size()];

    loop {
        match verified.read(&mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    tracing::trace!(bytes = verified.bytes_read(), "hashed stream");
    Ok(verified.into_digest())
}

pub fn hash_file_raw(path: impl AsRef<Path>) -> Result<Sha256Digest> {
    hash_file_raw_with(path, HashOptions::default())
}

pub fn hash_file_raw_with(path: impl AsRef<Path>, options: HashOptions) -> Result<Sha256Digest> {
    let path = path.as_ref();
    let read_err = |source| VerificationError::Read {
        path: path.to_path_buf(),
        source,
    };

    // The descriptor is closed when `file` drops, on every return path.
    let file = File::open(path).map_err(read_err)?;
    let digest = hash_reader(file, options).map_err(read_err)?;

    tracing::debug!(path = %path.display(), %digest, "hashed file");
    Ok(digest)
}

pub fn hash_file_hex(path: impl AsRef<Path>) -> Result<String> {
    hash_file_raw(path).map(|digest| digest.to_hex())
}

/// Hash `path` and compare against `expected_hex`.
///
/// I/O failures are returned unchanged. A malformed `expected_hex` never
/// matches.
pub fn check_file_hash(path: impl AsRef<Path>, expected_hex: &str) -> Result<Check> {
    check_file_hash_with(path, expected_hex, HashOptions::default())
}

pub fn check_file_hash_with(
    path: impl AsRef<Path>,
    expected_hex: &str,
    options: HashOptions,
) -> Result<Check> {
    let path = path.as_ref();
    let digest = hash_file_raw_with(path, options)?;

    if hex_equals(expected_hex, digest.as_bytes()) {
        Ok(Check::Matched)
    } else {
        tracing::debug!(
            path = %path.display(),
            expected = expected_hex,
            actual = %digest,
            "checksum mismatch"
        );
        Ok(Check::Mismatched)
    }
}
