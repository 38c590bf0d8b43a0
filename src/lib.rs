//! # generic-attest
//!
//! SLSA provenance for arbitrary build artifacts.
//!
//! Takes a base64-encoded `sha256sum` style checksum list, produces one
//! in-toto statement carrying a SLSA v1 build provenance predicate for all
//! listed artifacts, signs it as a DSSE envelope, records it in a Rekor
//! transparency log and appends the resulting bundle to an `.intoto.jsonl`
//! file.
//!
//! ## Quick Start
//!
//! ```bash
//! sha256sum artifact1 artifact2 | base64 -w0 > subjects.b64
//! generic-attest attest \
//!     --subjects="$(cat subjects.b64)" \
//!     --key=signing-key.pem
//! ```
//!
//! The build context is read from the `GITHUB_CONTEXT` environment variable,
//! which a workflow sets with `GITHUB_CONTEXT: ${{ toJSON(github) }}`.

pub mod attest;
pub mod cli;
pub mod context;
pub mod error;
pub mod hash;
pub mod in_toto;
pub mod output;
pub mod signing;
pub mod slsa;
pub mod subjects;
#[cfg(test)]
mod tests;
pub mod tlog;

use std::path::PathBuf;

// Re-export error types
pub use error::{Error, ErrorKind, Result};

/// CLI configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to private key for signing
    pub key_path: Option<PathBuf>,
    /// Hash algorithm used by the signer
    pub hash_alg: hash::HashAlgorithm,
    /// Base URL of the Rekor instance
    pub rekor_url: String,
    /// Directory attestation files must stay inside
    pub output_root: PathBuf,
    /// Environment variable holding the build context
    pub context_var: String,
    /// Builder id recorded in the provenance
    pub builder_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_path: None,
            hash_alg: hash::HashAlgorithm::default(),
            rekor_url: tlog::rekor::DEFAULT_REKOR_URL.to_string(),
            output_root: PathBuf::from("."),
            context_var: context::GITHUB_CONTEXT_VAR.to_string(),
            builder_id: slsa::provenance::GENERIC_BUILDER_ID.to_string(),
        }
    }
}

/// Initialize logging for the CLI
///
/// # Examples
///
/// ```
/// use generic_attest::init_logging;
///
/// // Initialize with default settings
/// let result = init_logging();
/// // Note: This might fail if already initialized
/// assert!(result.is_ok() || result.is_err());
/// ```
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}

// Re-export commonly used types and traits
pub use attest::{Attestor, SignedBundle};
pub use context::ContextProvider;
pub use signing::Signer;
pub use tlog::TransparencyLog;
