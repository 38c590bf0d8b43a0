use crate::error::{Error, Result};
use crate::hash::{HashAlgorithm, calculate_hash_with_algorithm};
use crate::signing::{self, SecurePrivateKey};

use log::debug;
use std::path::Path;

/// Output of a signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutput {
    pub sig: Vec<u8>,
    /// Optional hint identifying the key, copied into the DSSE signature.
    pub keyid: String,
    /// PEM-encoded certificate or public key that verifies `sig`.
    pub certificate: String,
}

/// A capability that signs opaque bytes.
///
/// The attestation pipeline hands it the DSSE pre-authentication encoding of
/// the statement and does not retry on failure; any retry policy belongs to
/// the implementation.
pub trait Signer {
    fn sign(&self, data: &[u8]) -> Result<SigningOutput>;
}

/// Signs with a local PEM private key.
pub struct KeySigner {
    key: SecurePrivateKey,
    hash_alg: HashAlgorithm,
    public_key_pem: String,
    keyid: String,
}

impl KeySigner {
    pub fn new(key: SecurePrivateKey, hash_alg: HashAlgorithm) -> Result<Self> {
        let public_key_pem = key
            .as_pkey()
            .public_key_to_pem()
            .map_err(|e| Error::Signing(format!("Failed to export public key: {e}")))?;
        let public_key_der = key
            .as_pkey()
            .public_key_to_der()
            .map_err(|e| Error::Signing(format!("Failed to export public key: {e}")))?;

        let public_key_pem = String::from_utf8(public_key_pem)
            .map_err(|e| Error::Signing(format!("Public key PEM is not UTF-8: {e}")))?;
        let keyid = calculate_hash_with_algorithm(&public_key_der, &HashAlgorithm::Sha256);

        Ok(Self {
            key,
            hash_alg,
            public_key_pem,
            keyid,
        })
    }

    pub fn from_file(key_path: &Path, hash_alg: HashAlgorithm) -> Result<Self> {
        let key = signing::load_private_key(key_path)?;
        debug!("loaded {} signing key from {}", key.key_type(), key_path.display());
        Self::new(key, hash_alg)
    }

    /// Hex SHA-256 of the DER-encoded public key.
    pub fn keyid(&self) -> &str {
        &self.keyid
    }
}

impl Signer for KeySigner {
    fn sign(&self, data: &[u8]) -> Result<SigningOutput> {
        let sig = signing::sign_message(data, &self.key, &self.hash_alg)?;

        Ok(SigningOutput {
            sig,
            keyid: self.keyid.clone(),
            certificate: self.public_key_pem.clone(),
        })
    }
}
