//! # Signing
//!
//! PEM private-key handling on top of `openssl`, plus the [`Signer`]
//! capability the attestation pipeline signs through.
//!
//! RSA and ECDSA keys sign a digest of the message computed with the
//! configured [`HashAlgorithm`]. Ed25519 keys hash internally, so the
//! configured algorithm is ignored for them. Key bytes are wrapped in
//! `Zeroizing` so they are cleared when the key is dropped.

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Private, Public};
use std::fmt;
use std::fs::read;
use std::path::Path;
use zeroize::{ZeroizeOnDrop, Zeroizing};

pub mod signer;

pub use signer::{KeySigner, Signer, SigningOutput};

/// Key algorithms the signer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Rsa,
    Ecdsa,
    Ed25519,
}

impl KeyType {
    fn from_id(id: Id) -> Result<Self> {
        match id {
            Id::RSA => Ok(KeyType::Rsa),
            Id::EC => Ok(KeyType::Ecdsa),
            Id::ED25519 => Ok(KeyType::Ed25519),
            other => Err(Error::Signing(format!(
                "Unsupported key type {}",
                other.as_raw()
            ))),
        }
    }

    fn digest(self, algorithm: &HashAlgorithm) -> Option<MessageDigest> {
        match self {
            KeyType::Ed25519 => None,
            KeyType::Rsa | KeyType::Ecdsa => Some(match algorithm {
                HashAlgorithm::Sha256 => MessageDigest::sha256(),
                HashAlgorithm::Sha384 => MessageDigest::sha384(),
                HashAlgorithm::Sha512 => MessageDigest::sha512(),
            }),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Rsa => write!(f, "rsa"),
            KeyType::Ecdsa => write!(f, "ecdsa"),
            KeyType::Ed25519 => write!(f, "ed25519"),
        }
    }
}

/// Private key whose PEM source bytes are zeroized on drop
#[derive(ZeroizeOnDrop)]
pub struct SecurePrivateKey {
    #[zeroize(skip)]
    pkey: PKey<Private>,
    #[zeroize(skip)]
    key_type: KeyType,
    _key_data: Zeroizing<Vec<u8>>,
}

impl SecurePrivateKey {
    pub fn from_pem(pem_data: Vec<u8>) -> Result<Self> {
        let pem = Zeroizing::new(pem_data);

        let pkey = PKey::private_key_from_pem(&pem)
            .map_err(|e| Error::Signing(format!("Failed to load private key: {e}")))?;
        let key_type = KeyType::from_id(pkey.id())?;

        Ok(Self {
            pkey,
            key_type,
            _key_data: pem,
        })
    }

    pub fn as_pkey(&self) -> &PKey<Private> {
        &self.pkey
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }
}

pub fn load_private_key(key_path: &Path) -> Result<SecurePrivateKey> {
    let key_data = read(key_path)?;
    SecurePrivateKey::from_pem(key_data)
}

/// Signs `data`, hashing with `algorithm` where the key type takes a digest.
pub fn sign_message(
    data: &[u8],
    private_key: &SecurePrivateKey,
    algorithm: &HashAlgorithm,
) -> Result<Vec<u8>> {
    let pkey = private_key.as_pkey();
    let sign_err = |e: openssl::error::ErrorStack| Error::Signing(format!("Failed to sign data: {e}"));

    let Some(digest) = private_key.key_type().digest(algorithm) else {
        let mut signer = openssl::sign::Signer::new_without_digest(pkey).map_err(sign_err)?;
        return signer.sign_oneshot_to_vec(data).map_err(sign_err);
    };

    let mut signer = openssl::sign::Signer::new(digest, pkey).map_err(sign_err)?;
    signer.update(data).map_err(sign_err)?;

    let sig_len = signer.len().map_err(sign_err)?;
    let mut signature = Zeroizing::new(vec![0u8; sig_len]);
    let len = signer.sign(&mut signature).map_err(sign_err)?;

    // ECDSA signatures can be shorter than the reported maximum
    Ok(signature[..len].to_vec())
}

/// Checks `signature` over `data`. A well-formed but wrong signature is
/// `Ok(false)`.
pub fn verify_message(
    data: &[u8],
    signature: &[u8],
    public_key: &PKey<Public>,
    algorithm: &HashAlgorithm,
) -> Result<bool> {
    let verify_err = |e: openssl::error::ErrorStack| Error::Signing(e.to_string());

    match KeyType::from_id(public_key.id())?.digest(algorithm) {
        None => openssl::sign::Verifier::new_without_digest(public_key)
            .map_err(verify_err)?
            .verify_oneshot(signature, data)
            .map_err(verify_err),
        Some(digest) => {
            let mut verifier =
                openssl::sign::Verifier::new(digest, public_key).map_err(verify_err)?;
            verifier.update(data).map_err(verify_err)?;
            verifier.verify(signature).map_err(verify_err)
        }
    }
}

/// Load a PEM-encoded public key, e.g. the certificate material of a bundle.
pub fn public_key_from_pem(pem: &[u8]) -> Result<PKey<Public>> {
    PKey::public_key_from_pem(pem)
        .map_err(|e| Error::Signing(format!("Failed to load public key: {e}")))
}
