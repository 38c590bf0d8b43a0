//! # Hash Module
//!
//! Digest helpers shared by the subject parser, the signer and the
//! transparency-log client. Supports SHA-256, SHA-384 and SHA-512.
//!
//! ## Examples
//!
//! ```
//! use generic_attest::hash::{HashAlgorithm, calculate_hash_with_algorithm, is_hex_digest};
//!
//! let hash = calculate_hash_with_algorithm(b"Hello, World!", &HashAlgorithm::Sha256);
//! assert_eq!(hash.len(), 64);
//! assert!(is_hex_digest(&hash, &HashAlgorithm::Sha256));
//! ```

use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Name used as the key of an in-toto digest set.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length of the hex encoding of a digest produced by this algorithm.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha384 => 96,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculate hash of data using the specified algorithm
///
/// Returns the lowercase hexadecimal encoding of the digest.
pub fn calculate_hash_with_algorithm(data: &[u8], algorithm: &HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}

/// Verify hash with an explicitly specified algorithm
///
/// The comparison runs in constant time over the decoded digest bytes.
/// Malformed hex on either side never verifies.
pub fn verify_hash_with_algorithm(
    data: &[u8],
    expected_hash: &str,
    algorithm: &HashAlgorithm,
) -> bool {
    let calculated_hash = calculate_hash_with_algorithm(data, algorithm);

    let calculated_bytes = match hex::decode(calculated_hash) {
        Ok(b) => b,
        Err(_) => return false,
    };
    let expected_bytes = match hex::decode(expected_hash) {
        Ok(b) => b,
        Err(_) => return false,
    };

    if calculated_bytes.len() != expected_bytes.len() {
        return false;
    }

    calculated_bytes.ct_eq(&expected_bytes).into()
}

/// Check that `digest` is a lowercase hex string of the exact length
/// `algorithm` produces. Uppercase hex is rejected.
pub fn is_hex_digest(digest: &str, algorithm: &HashAlgorithm) -> bool {
    digest.len() == algorithm.hex_len()
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
