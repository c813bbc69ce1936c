use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid hex digest length: expected 64, got {0}")]
    InvalidHexLength(usize),

    #[error("invalid digest length: expected 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    #[error("invalid hex digest: {0:?}")]
    InvalidHex(String),
}

impl VerificationError {
    /// Underlying I/O error, carrying the OS error code unchanged.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, VerificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_only_for_reads() {
        let read = VerificationError::Read {
            path:   PathBuf::from("etc/passwd"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(read.is_not_found());

        assert!(VerificationError::InvalidHexLength(3).io_error().is_none());
        assert!(!VerificationError::InvalidHex("zz".into()).is_not_found());
    }
}
