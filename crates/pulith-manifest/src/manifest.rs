use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{FileCollection, FileEntry, Result};

/// One file record: installed path plus recorded digest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ManifestEntry {
    pub fn new(file: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            file:   Some(file.into()),
            sha256: Some(sha256.into()),
        }
    }

    /// An entry without a recorded digest, e.g. a directory.
    pub fn untracked(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Read one array element. Fields that are missing or not strings are
    /// left empty; they never affect the other records of the section.
    fn from_record(record: &Value) -> Self {
        let field = |name: &str| {
            record
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            file:   field("file"),
            sha256: field("sha256"),
        }
    }
}

impl FileEntry for ManifestEntry {
    fn file(&self) -> Option<&str> { self.file.as_deref() }
    fn sha256(&self) -> Option<&str> { self.sha256.as_deref() }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
enum Section {
    Entries(Vec<ManifestEntry>),
    Other(Value),
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(records) => {
                let entries: Vec<_> = records.iter().map(ManifestEntry::from_record).collect();
                let malformed = entries.iter().filter(|e| e.file.is_none()).count();
                if malformed > 0 {
                    tracing::warn!(malformed, total = entries.len(), "records without a file path");
                }
                Ok(Section::Entries(entries))
            }
            other => Ok(Section::Other(other)),
        }
    }
}

/// JSON package file metadata: a top-level object of keyed sections.
///
/// ```json
/// {
///   "pkgver": "foo-1.0_1",
///   "files": [{ "file": "/usr/bin/foo", "sha256": "..." }],
///   "conf_files": [{ "file": "/etc/foo.conf", "sha256": "..." }]
/// }
/// ```
///
/// Sections that are not arrays are kept but yield no entries. Inside an
/// array, each element is read on its own: a malformed record loses only
/// its own fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    sections: BTreeMap<String, Section>,
}

impl Manifest {
    pub fn new() -> Self { Self::default() }

    pub fn with_entries(
        mut self,
        key: impl Into<String>,
        entries: impl IntoIterator<Item = ManifestEntry>,
    ) -> Self {
        self.insert_entries(key, entries);
        self
    }

    /// Replace the section under `key`.
    pub fn insert_entries(
        &mut self,
        key: impl Into<String>,
        entries: impl IntoIterator<Item = ManifestEntry>,
    ) {
        self.sections
            .insert(key.into(), Section::Entries(entries.into_iter().collect()));
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(bytes)?) }

    /// Parse a manifest file through a read-only mapping.
    #[cfg(unix)]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let mapped = pulith_fs::map_file(path)?;
        let manifest = Self::from_slice(mapped.as_bytes())?;
        tracing::debug!(
            path = %path.display(),
            sections = manifest.sections.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> { Ok(serde_json::to_vec_pretty(self)?) }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.sections.keys().map(String::as_str) }
}

impl FromStr for Manifest {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> { Self::from_slice(s.as_bytes()) }
}

impl FileCollection for Manifest {
    type Entry = ManifestEntry;
    type Entries<'a> = std::slice::Iter<'a, ManifestEntry>;

    fn entries(&self, key: &str) -> Option<Self::Entries<'_>> {
        match self.sections.get(key)? {
            Section::Entries(entries) => Some(entries.iter()),
            Section::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pkgver": "foo-1.0_1",
        "files": [
            { "file": "/usr/bin/foo", "sha256": "aa", "size": 10 },
            { "file": "/usr/share/foo/data" }
        ],
        "links": [{ "file": "/usr/bin/bar", "target": "foo" }],
        "dirs": ["not", "records"],
        "conf_files": { "file": "/etc/foo.conf" }
    }"#;

    #[test]
    fn test_parse_sections() {
        let manifest: Manifest = SAMPLE.parse().unwrap();

        let files: Vec<_> = manifest.entries("files").unwrap().collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].sha256(), Some("aa"));
        assert_eq!(files[1].sha256(), None);

        let links: Vec<_> = manifest.entries("links").unwrap().collect();
        assert_eq!(links[0].file(), Some("/usr/bin/bar"));
        assert_eq!(links[0].sha256(), None);
    }

    #[test]
    fn test_non_array_sections_have_no_entries() {
        let manifest: Manifest = SAMPLE.parse().unwrap();
        assert!(manifest.entries("pkgver").is_none());
        assert!(manifest.entries("conf_files").is_none());
        assert!(manifest.entries("alternatives").is_none());
        assert_eq!(manifest.keys().count(), 5);
    }

    #[test]
    fn test_malformed_record_keeps_section() {
        let manifest: Manifest = r#"{
            "files": [
                { "file": "/usr/bin/foo", "sha256": "aa" },
                { "file": "/usr/bin/bad", "sha256": 1 },
                { "file": 7, "sha256": "bb" },
                "stray"
            ]
        }"#
        .parse()
        .unwrap();

        let files: Vec<_> = manifest.entries("files").unwrap().collect();
        assert_eq!(files.len(), 4);
        assert_eq!(files[0], &ManifestEntry::new("/usr/bin/foo", "aa"));
        assert_eq!(files[1], &ManifestEntry::untracked("/usr/bin/bad"));
        assert_eq!(files[2].file(), None);
        assert_eq!(files[2].sha256(), Some("bb"));
        assert_eq!(files[3], &ManifestEntry::default());
    }

    #[test]
    fn test_array_of_non_records_yields_pathless_entries() {
        let manifest: Manifest = SAMPLE.parse().unwrap();
        let dirs: Vec<_> = manifest.entries("dirs").unwrap().collect();
        assert_eq!(dirs.len(), 2);
        assert!(dirs.iter().all(|entry| entry.file().is_none()));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!("[1, 2, 3]".parse::<Manifest>().is_err());
        assert!("not json".parse::<Manifest>().is_err());
    }

    #[test]
    fn test_builder_serializes_back() {
        let manifest = Manifest::new()
            .with_entries("files", [ManifestEntry::new("etc/passwd", "ab")])
            .with_entries("dirs", [ManifestEntry::untracked("etc")]);

        let reparsed = Manifest::from_slice(&manifest.to_vec().unwrap()).unwrap();
        assert_eq!(reparsed, manifest);
    }
}
