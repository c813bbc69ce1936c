//! SHA-256 content verification primitives.
//!
//! Streams files through an incremental SHA-256 accumulator and compares the
//! result against lowercase hex digests as recorded in package metadata.
//!
//! # Example
//!
//! ```
//! use pulith_verify::{Check, Sha256Hasher, check_file_hash};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("hello.txt");
//! std::fs::write(&path, b"hello world").unwrap();
//!
//! let expected = Sha256Hasher::digest(b"hello world").to_hex();
//! assert_eq!(check_file_hash(&path, &expected).unwrap(), Check::Matched);
//! ```

pub use self::digest::{
    SHA256_DIGEST_LEN, SHA256_HEX_LEN, Sha256Digest, compare_hex, hex_encode, hex_equals,
};
pub use self::error::{Result, VerificationError};
pub use self::file::{
    Check, DEFAULT_CHUNK_SIZE, HashOptions, check_file_hash, check_file_hash_with, hash_file_hex,
    hash_file_raw, hash_file_raw_with, hash_reader,
};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::reader::VerifiedReader;

mod digest;
mod error;
mod file;
mod hasher;
mod reader;
