use std::collections::HashMap;

/// A single file record in package metadata.
pub trait FileEntry {
    fn file(&self) -> Option<&str>;
    fn sha256(&self) -> Option<&str>;
}

/// Keyed arrays of file records, e.g. `files` or `conf_files`.
pub trait FileCollection {
    type Entry: FileEntry;
    type Entries<'a>: Iterator<Item = &'a Self::Entry>
    where
        Self: 'a;

    /// Entries stored under `key`, in order. `None` if `key` holds no array.
    fn entries(&self, key: &str) -> Option<Self::Entries<'_>>;
}

impl<E: FileEntry> FileCollection for HashMap<String, Vec<E>> {
    type Entry = E;
    type Entries<'a>
        = std::slice::Iter<'a, E>
    where
        Self: 'a;

    fn entries(&self, key: &str) -> Option<Self::Entries<'_>> { self.get(key).map(|v| v.iter()) }
}
