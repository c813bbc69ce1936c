use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Verify(#[from] pulith_verify::VerificationError),

    #[error(transparent)]
    Fs(#[from] pulith_fs::Error),

    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    /// Underlying I/O error, carrying the OS error code unchanged.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Verify(e) => e.io_error(),
            Self::Fs(e) => e.io_error(),
            Self::Parse(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
