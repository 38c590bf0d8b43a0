use crate::hash::HashAlgorithm;

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HashAlgorithmChoice {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithmChoice {
    pub fn to_hash_algorithm(self) -> HashAlgorithm {
        match self {
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmChoice::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

#[derive(Debug, Args)]
pub struct AttestArgs {
    /// Base64-encoded sha256sum output listing the artifacts to attest
    #[arg(long = "subjects")]
    pub subjects: String,

    /// Attestation file to write (must end in .intoto.jsonl)
    #[arg(long = "signature")]
    pub signature: Option<String>,

    /// Path to private key file for signing (PEM format)
    #[arg(long = "key", env = "ATTEST_SIGNING_KEY")]
    pub key: Option<PathBuf>,

    /// Hash algorithm to use for signing (default: sha256)
    #[arg(long = "hash-alg", value_enum, default_value = "sha256")]
    pub hash_alg: HashAlgorithmChoice,

    /// Rekor transparency log URL
    #[arg(long = "rekor-url", env = "REKOR_URL")]
    pub rekor_url: Option<String>,

    /// Directory attestation files must stay inside (default: current directory)
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Builder id recorded in the provenance
    #[arg(long = "builder-id")]
    pub builder_id: Option<String>,
}
