//! Verify installed files against digests recorded in package metadata.
//!
//! Metadata is any [`FileCollection`]: keyed arrays of records carrying a
//! `file` path and a `sha256` digest. [`Manifest`] is the JSON baseline.
//!
//! ```
//! use pulith_manifest::{Handle, Manifest, ManifestEntry, Outcome, verify_against_metadata};
//!
//! let root = tempfile::tempdir().unwrap();
//! std::fs::create_dir(root.path().join("etc")).unwrap();
//! std::fs::write(root.path().join("etc/hostname"), b"void\n").unwrap();
//!
//! let digest = pulith_verify::Sha256Hasher::digest(b"void\n").to_hex();
//! let manifest = Manifest::new().with_entries("files", [ManifestEntry::new("etc/hostname", digest)]);
//! let handle = Handle::new().rootdir(root.path());
//!
//! let outcome = verify_against_metadata(&handle, &manifest, "files", "etc/hostname").unwrap();
//! assert_eq!(outcome, Outcome::Matched);
//! ```

pub use self::collection::{FileCollection, FileEntry};
pub use self::error::{Error, Result};
pub use self::handle::Handle;
pub use self::manifest::{Manifest, ManifestEntry};
pub use self::verify::{
    Mismatch, Outcome, VerifyReport, find_expected_digest, verify_against_metadata, verify_entries,
};

mod collection;
mod error;
mod handle;
mod manifest;
mod verify;
