use crate::Config;
use crate::attest::Attestor;
use crate::context::EnvContextProvider;
use crate::error::{Error, Result};
use crate::output;
use crate::signing::KeySigner;
use crate::subjects::parse_subjects;
use crate::tlog::RekorLog;

use super::commands::AttestArgs;
use log::debug;
use std::path::PathBuf;

/// Builds the run configuration from parsed arguments. Environment fallbacks
/// are already applied by clap.
pub fn config_from_args(args: &AttestArgs) -> Config {
    let mut config = Config {
        key_path: args.key.clone(),
        hash_alg: args.hash_alg.to_hash_algorithm(),
        ..Config::default()
    };

    if let Some(url) = &args.rekor_url {
        config.rekor_url = url.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_root = dir.clone();
    }
    if let Some(id) = &args.builder_id {
        config.builder_id = id.clone();
    }

    config
}

pub fn handle_attest_command(args: AttestArgs) -> Result<PathBuf> {
    let config = config_from_args(&args);
    debug!("attest config: {config:?}");

    // bad input should fail before the key is touched
    let subjects = parse_subjects(&args.subjects)?;
    output::resolve_output_path(&subjects, args.signature.as_deref(), &config.output_root)?;

    let key_path = config.key_path.as_deref().ok_or_else(|| {
        Error::Signing("No signing key given; pass --key or set ATTEST_SIGNING_KEY".to_string())
    })?;
    let signer = KeySigner::from_file(key_path, config.hash_alg).map_err(|e| match e {
        Error::Signing(_) => e,
        other => Error::Signing(format!(
            "Failed to load key {}: {other}",
            key_path.display()
        )),
    })?;

    let context_provider = EnvContextProvider::new(config.context_var.as_str());
    debug!("reading build context from {}", context_provider.var());
    let rekor = RekorLog::new_with_url(config.rekor_url.clone())?;

    Attestor::new(&context_provider, &signer, &rekor)
        .with_builder_id(config.builder_id.as_str())
        .attest_subjects(&subjects, args.signature.as_deref(), &config.output_root)
}
