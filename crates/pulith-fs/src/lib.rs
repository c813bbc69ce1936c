//! Read-only file mapping for NUL-terminated text access.
//!
//! [`map_file`] maps a file privately and guarantees that the byte right after
//! the last logical byte is readable and zero, so callers can scan the mapping
//! as C text without copying it first.

mod error;

#[cfg(unix)]
mod mmap;

pub use error::{Error, Result};

#[cfg(unix)]
pub use mmap::{MapLayout, MappedFile, map_file, page_size};
