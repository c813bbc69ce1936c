use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pulith_verify::HashOptions;

/// Verification settings: the root directory packages are installed under
/// and how files are read while hashing.
#[derive(Clone, Debug)]
pub struct Handle {
    rootdir:      PathBuf,
    hash_options: HashOptions,
}

impl Default for Handle {
    fn default() -> Self { Self::new() }
}

impl Handle {
    pub fn new() -> Self {
        Self {
            rootdir:      PathBuf::from("/"),
            hash_options: HashOptions::default(),
        }
    }

    pub fn rootdir(mut self, rootdir: impl Into<PathBuf>) -> Self {
        self.rootdir = rootdir.into();
        self
    }

    pub fn hash_options(mut self, hash_options: HashOptions) -> Self {
        self.hash_options = hash_options;
        self
    }

    pub fn get_rootdir(&self) -> &Path { &self.rootdir }

    pub fn get_hash_options(&self) -> HashOptions { self.hash_options }

    /// Location of a package path on disk.
    ///
    /// With a rootdir of exactly `/` the path is used as is. Otherwise the
    /// rootdir and path are joined with a single `/`, so absolute package
    /// paths still land under the rootdir.
    pub fn effective_path<'a>(&self, path: &'a str) -> Cow<'a, Path> {
        if self.rootdir.as_os_str() == "/" {
            return Cow::Borrowed(Path::new(path));
        }
        let mut joined = OsString::with_capacity(self.rootdir.as_os_str().len() + 1 + path.len());
        joined.push(self.rootdir.as_os_str());
        joined.push("/");
        joined.push(path);
        Cow::Owned(PathBuf::from(joined))
    }
}
