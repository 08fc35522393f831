//! Message digests used by the supported algorithms.

use sha2::{Digest, Sha256, Sha384, Sha512};

/// SHA-2 digest variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    /// SHA2-256
    Sha2_256,

    /// SHA2-384
    Sha2_384,

    /// SHA2-512
    Sha2_512,
}

impl HashAlgorithm {
    /// The digest length in bytes.
    #[must_use]
    pub const fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha2_256 => 32,
            HashAlgorithm::Sha2_384 => 48,
            HashAlgorithm::Sha2_512 => 64,
        }
    }

    /// Hash `msg` in one shot.
    #[must_use]
    pub fn digest(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha2_256 => Sha256::digest(msg).to_vec(),
            HashAlgorithm::Sha2_384 => Sha384::digest(msg).to_vec(),
            HashAlgorithm::Sha2_512 => Sha512::digest(msg).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths_match_output_len() {
        for hash in [
            HashAlgorithm::Sha2_256,
            HashAlgorithm::Sha2_384,
            HashAlgorithm::Sha2_512,
        ] {
            assert_eq!(hash.digest(b"abc").len(), hash.output_len());
        }
    }
}
