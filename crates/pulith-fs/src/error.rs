use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to stat '{path}': {source}")]
    Stat { path: PathBuf, source: io::Error },

    #[error("file too large to map: '{path}' ({size} bytes)")]
    TooLarge { path: PathBuf, size: u64 },

    #[error("failed to map '{path}': {source}")]
    Map { path: PathBuf, source: io::Error },

    #[error("failed to unmap region: {0}")]
    Unmap(io::Error),

    #[error("unable to determine page size")]
    PageSize,
}

impl Error {
    /// Underlying OS error, if the failure came from the OS boundary.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Open { source, .. } | Self::Stat { source, .. } | Self::Map { source, .. } => {
                Some(source)
            }
            Self::Unmap(source) => Some(source),
            Self::TooLarge { .. } | Self::PageSize => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

