use std::collections::HashSet;

use pulith_verify::{Check, check_file_hash_with};

use crate::{Error, FileCollection, FileEntry, Handle, Result};

/// Why a tracked file did not verify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// File contents differ from the recorded digest.
    Content,
    /// File is absent from disk.
    Missing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    Mismatched(Mismatch),
    /// No digest is recorded for the path.
    NotFound,
}

/// Recorded digest for `path` under `key`.
///
/// The first entry whose `file` equals `path` decides, even if it carries no
/// digest.
pub fn find_expected_digest<'a, C>(collection: &'a C, key: &str, path: &str) -> Option<&'a str>
where
    C: FileCollection + ?Sized,
{
    collection
        .entries(key)?
        .find(|entry| entry.file() == Some(path))
        .and_then(|entry| entry.sha256())
}

/// Verify the on-disk file for `path` against its recorded digest.
///
/// A file missing from disk is reported as a mismatch; other I/O failures
/// are returned as errors.
pub fn verify_against_metadata<C>(
    handle: &Handle,
    collection: &C,
    key: &str,
    path: &str,
) -> Result<Outcome>
where
    C: FileCollection + ?Sized,
{
    let Some(expected) = find_expected_digest(collection, key, path) else {
        tracing::debug!(key, path, "no recorded digest");
        return Ok(Outcome::NotFound);
    };
    Ok(match check_entry(handle, path, expected)? {
        None => Outcome::Matched,
        Some(reason) => Outcome::Mismatched(reason),
    })
}

/// `None` when the file matches its recorded digest.
fn check_entry(handle: &Handle, path: &str, expected: &str) -> Result<Option<Mismatch>> {
    let target = handle.effective_path(path);
    match check_file_hash_with(&target, expected, handle.get_hash_options()) {
        Ok(Check::Matched) => Ok(None),
        Ok(Check::Mismatched) => Ok(Some(Mismatch::Content)),
        Err(err) if err.is_not_found() => {
            tracing::debug!(path = %target.display(), "tracked file missing");
            Ok(Some(Mismatch::Missing))
        }
        Err(err) => Err(err.into()),
    }
}

/// Per-path results of verifying a whole section.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub matched:    Vec<String>,
    pub mismatched: Vec<(String, Mismatch)>,
    /// Entries that carry no digest.
    pub untracked:  Vec<String>,
    pub failed:     Vec<(String, Error)>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool { self.mismatched.is_empty() && self.failed.is_empty() }

    pub fn total(&self) -> usize {
        self.matched.len() + self.mismatched.len() + self.untracked.len() + self.failed.len()
    }
}

/// Verify every entry under `key`.
///
/// Entries without a `file` are skipped. For duplicate paths only the first
/// entry is checked, as in [`find_expected_digest`]. I/O failures are
/// collected rather than aborting the run.
pub fn verify_entries<C>(handle: &Handle, collection: &C, key: &str) -> VerifyReport
where
    C: FileCollection + ?Sized,
{
    let mut report = VerifyReport::default();
    let Some(entries) = collection.entries(key) else {
        return report;
    };

    let mut seen = HashSet::new();
    for entry in entries {
        let Some(path) = entry.file() else { continue };
        if !seen.insert(path) {
            continue;
        }
        let Some(expected) = entry.sha256() else {
            report.untracked.push(path.to_string());
            continue;
        };

        match check_entry(handle, path, expected) {
            Ok(None) => report.matched.push(path.to_string()),
            Ok(Some(reason)) => report.mismatched.push((path.to_string(), reason)),
            Err(err) => {
                tracing::warn!(path, %err, "failed to verify file");
                report.failed.push((path.to_string(), err));
            }
        }
    }

    tracing::debug!(
        key,
        matched = report.matched.len(),
        mismatched = report.mismatched.len(),
        failed = report.failed.len(),
        "verified section"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::ManifestEntry;

    fn collection() -> HashMap<String, Vec<ManifestEntry>> {
        HashMap::from([(
            "files".to_string(),
            vec![
                ManifestEntry::new("etc/passwd", "first"),
                ManifestEntry::new("etc/passwd", "second"),
                ManifestEntry::untracked("etc/group"),
                ManifestEntry {
                    sha256: Some("orphan".into()),
                    ..ManifestEntry::default()
                },
            ],
        )])
    }

    #[test]
    fn test_first_duplicate_wins() {
        assert_eq!(find_expected_digest(&collection(), "files", "etc/passwd"), Some("first"));
    }

    #[test]
    fn test_entry_without_digest_is_not_found() {
        assert_eq!(find_expected_digest(&collection(), "files", "etc/group"), None);
    }

    #[test]
    fn test_missing_key_or_path() {
        let collection = collection();
        assert_eq!(find_expected_digest(&collection, "conf_files", "etc/passwd"), None);
        assert_eq!(find_expected_digest(&collection, "files", "etc/shadow"), None);
        assert_eq!(find_expected_digest(&collection, "files", ""), None);
    }

    #[test]
    fn test_not_tracked_skips_filesystem() {
        let handle = Handle::new().rootdir("/nonexistent-root");
        let outcome = verify_against_metadata(&handle, &collection(), "files", "etc/group").unwrap();
        assert_eq!(outcome, Outcome::NotFound);
    }
}
