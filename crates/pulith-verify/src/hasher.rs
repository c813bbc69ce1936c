use sha2::Digest;

use crate::Sha256Digest;

/// Incremental hash accumulator.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

#[derive(Clone, Default)]
pub struct Sha256Hasher(sha2::Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

impl Sha256Hasher {
    pub fn new() -> Self { Self(sha2::Sha256::new()) }

    /// Finalize into a fixed-size digest.
    pub fn finish(self) -> Sha256Digest { Sha256Digest::from_bytes(self.0.finalize().into()) }

    pub fn digest(data: &[u8]) -> Sha256Digest {
        Sha256Digest::from_bytes(sha2::Sha256::digest(data).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hasher() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        let hash = hasher.finalize();

        let expected =
            hex::decode("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_finish_matches_one_shot_digest() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"split");
        hasher.update(b" input");
        assert_eq!(hasher.finish(), Sha256Hasher::digest(b"split input"));
    }
}
