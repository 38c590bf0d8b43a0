//! # Attestation Pipeline
//!
//! Turns a parsed subject list into a signed, logged SLSA provenance bundle.
//! The steps run in a fixed order and each one consumes the previous output:
//!
//! 1. read the build context
//! 2. build the provenance predicate and the in-toto statement
//! 3. sign the statement's DSSE encoding
//! 4. record the signed statement in the transparency log
//!
//! The first failure aborts the run. No step is retried here; collaborators
//! that want retries do them internally.

use crate::context::ContextProvider;
use crate::error::{Error, Result};
use crate::in_toto::dsse::Envelope;
use crate::in_toto::generate_statement_envelope;
use crate::output;
use crate::signing::Signer;
use crate::slsa::BUILD_PROVENANCE_PREDICATE_TYPE_V1;
use crate::slsa::provenance::{GENERIC_BUILDER_ID, generate_provenance_predicate};
use crate::subjects::{SubjectList, parse_subjects};
use crate::tlog::{LogEntryRef, SignedStatement, TransparencyLog};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Material a verifier needs besides the envelope itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMaterial {
    /// PEM certificate or public key for the envelope signature.
    pub certificate: String,
    pub tlog_entries: Vec<LogEntryRef>,
}

/// A signed provenance statement together with its transparency-log entry.
///
/// Serialized as one JSON object per line in `.intoto.jsonl` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBundle {
    pub dsse_envelope: Envelope,
    pub verification_material: VerificationMaterial,
}

impl SignedBundle {
    /// Compact JSON without a trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim_end())?)
    }

    /// Decodes the in-toto statement carried by the envelope.
    pub fn statement(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(self.dsse_envelope.payload())?)
    }
}

/// The collaborators of one attestation run.
pub struct Attestor<'a> {
    context_provider: &'a dyn ContextProvider,
    signer: &'a dyn Signer,
    transparency_log: &'a dyn TransparencyLog,
    builder_id: String,
}

impl<'a> Attestor<'a> {
    pub fn new(
        context_provider: &'a dyn ContextProvider,
        signer: &'a dyn Signer,
        transparency_log: &'a dyn TransparencyLog,
    ) -> Self {
        Self {
            context_provider,
            signer,
            transparency_log,
            builder_id: GENERIC_BUILDER_ID.to_string(),
        }
    }

    pub fn with_builder_id(mut self, builder_id: impl Into<String>) -> Self {
        self.builder_id = builder_id.into();
        self
    }

    pub fn builder_id(&self) -> &str {
        &self.builder_id
    }

    /// Builds, signs and logs one provenance statement covering `subjects`.
    pub fn build_and_sign(&self, subjects: &SubjectList) -> Result<SignedBundle> {
        let ctx = self.context_provider.build_context().map_err(|e| match e {
            Error::Context(_) => e,
            other => Error::Context(other.to_string()),
        })?;
        debug!(
            "build context for {}",
            ctx.repository.as_deref().unwrap_or("<unknown repository>")
        );

        let predicate = generate_provenance_predicate(&ctx, &self.builder_id)?;
        let mut envelope = generate_statement_envelope(
            &subjects.to_resource_descriptors(),
            BUILD_PROVENANCE_PREDICATE_TYPE_V1,
            &predicate,
        )?;

        let signed = self.signer.sign(&envelope.pae()).map_err(|e| match e {
            Error::Signing(_) => e,
            other => Error::Signing(other.to_string()),
        })?;
        envelope.add_signature(signed.sig, signed.keyid)?;
        info!("Signed provenance for {} subject(s)", subjects.len());

        let statement = SignedStatement {
            envelope: &envelope,
            certificate: &signed.certificate,
        };
        let entry = self
            .transparency_log
            .record(&statement)
            .map_err(|e| match e {
                Error::TransparencyLog(_) => e,
                other => Error::TransparencyLog(other.to_string()),
            })?;
        info!("Recorded in transparency log at index {}", entry.log_index);

        Ok(SignedBundle {
            dsse_envelope: envelope,
            verification_material: VerificationMaterial {
                certificate: signed.certificate,
                tlog_entries: vec![entry],
            },
        })
    }

    /// Runs the whole pipeline: parse, sign and log, then write. Returns the
    /// written path.
    pub fn attest(
        &self,
        subjects_b64: &str,
        explicit_path: Option<&str>,
        root: &Path,
    ) -> Result<PathBuf> {
        let subjects = parse_subjects(subjects_b64)?;
        self.attest_subjects(&subjects, explicit_path, root)
    }

    /// Signs, logs and writes an attestation for already-parsed subjects.
    ///
    /// The output path is checked before anything is signed so that a bad
    /// path never leaves a log entry behind, and checked again when the
    /// bundle is written.
    pub fn attest_subjects(
        &self,
        subjects: &SubjectList,
        explicit_path: Option<&str>,
        root: &Path,
    ) -> Result<PathBuf> {
        if subjects.is_empty() {
            warn!("No subjects found; the attestation will cover zero artifacts");
        }

        output::resolve_output_path(subjects, explicit_path, root)?;
        let bundle = self.build_and_sign(subjects)?;

        output::resolve_and_write(&bundle, subjects, explicit_path, root)
    }
}

/// Builds, signs and logs one provenance statement with the default builder
/// id.
pub fn build_and_sign(
    subjects: &SubjectList,
    context_provider: &dyn ContextProvider,
    signer: &dyn Signer,
    transparency_log: &dyn TransparencyLog,
) -> Result<SignedBundle> {
    Attestor::new(context_provider, signer, transparency_log).build_and_sign(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::in_toto::dsse::pae;
    use crate::signing::SigningOutput;
    use crate::context::{BuildContext, NilContextProvider};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::cell::RefCell;

    struct RecordingSigner {
        seen: RefCell<Vec<Vec<u8>>>,
    }

    impl Signer for RecordingSigner {
        fn sign(&self, data: &[u8]) -> Result<SigningOutput> {
            self.seen.borrow_mut().push(data.to_vec());
            Ok(SigningOutput {
                sig: b"signature".to_vec(),
                keyid: "key-1".to_string(),
                certificate: "CERT".to_string(),
            })
        }
    }

    struct StaticLog;

    impl TransparencyLog for StaticLog {
        fn record(&self, statement: &SignedStatement<'_>) -> Result<LogEntryRef> {
            assert_eq!(statement.certificate, "CERT");
            assert_eq!(statement.envelope.signatures().len(), 1);
            Ok(LogEntryRef {
                uuid: "uuid-1".to_string(),
                log_index: 7,
                integrated_time: 1_700_000_000,
                log_id: "log".to_string(),
                url: "https://rekor.example/uuid-1".to_string(),
            })
        }
    }

    struct IoFailingContext;

    impl ContextProvider for IoFailingContext {
        fn build_context(&self) -> Result<BuildContext> {
            Err(std::io::Error::other("unreadable").into())
        }
    }

    struct EmptySigner;

    impl Signer for EmptySigner {
        fn sign(&self, _data: &[u8]) -> Result<SigningOutput> {
            Ok(SigningOutput {
                sig: vec![],
                keyid: String::new(),
                certificate: String::new(),
            })
        }
    }

    fn two_subjects() -> SubjectList {
        let text = "5b3513f580c8397212ff2c8f459c199efc0c90e4354a5f3533adf0a3fff3a530  artifact1\n\
                    8b3513f580c8397212ff2c8f459c199efc0c90e4354a5f3533adf0a3fff3a530  artifact2\n";
        parse_subjects(&STANDARD.encode(text)).unwrap()
    }

    fn recording_signer() -> RecordingSigner {
        RecordingSigner {
            seen: RefCell::new(vec![]),
        }
    }

    #[test]
    fn test_build_and_sign_single_statement() {
        let signer = recording_signer();
        let bundle =
            build_and_sign(&two_subjects(), &NilContextProvider, &signer, &StaticLog).unwrap();

        let statement = bundle.statement().unwrap();
        assert_eq!(statement["_type"], "https://in-toto.io/Statement/v1");
        assert_eq!(statement["predicateType"], BUILD_PROVENANCE_PREDICATE_TYPE_V1);
        let names: Vec<_> = statement["subject"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["artifact1", "artifact2"]);

        assert_eq!(bundle.verification_material.certificate, "CERT");
        assert_eq!(bundle.verification_material.tlog_entries[0].log_index, 7);
        assert_eq!(bundle.dsse_envelope.signatures()[0].keyid(), "key-1");
    }

    #[test]
    fn test_signer_receives_pae() {
        let signer = recording_signer();
        let bundle =
            build_and_sign(&two_subjects(), &NilContextProvider, &signer, &StaticLog).unwrap();

        let seen = signer.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            pae(
                bundle.dsse_envelope.payload_type(),
                bundle.dsse_envelope.payload()
            )
        );
    }

    #[test]
    fn test_empty_subject_list_is_attested() {
        let bundle = build_and_sign(
            &SubjectList::default(),
            &NilContextProvider,
            &recording_signer(),
            &StaticLog,
        )
        .unwrap();

        let statement = bundle.statement().unwrap();
        assert_eq!(statement["subject"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_context_errors_keep_their_stage() {
        let err = build_and_sign(
            &two_subjects(),
            &IoFailingContext,
            &recording_signer(),
            &StaticLog,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextFailure);
    }

    #[test]
    fn test_empty_signature_is_signing_failure() {
        let err = build_and_sign(&two_subjects(), &NilContextProvider, &EmptySigner, &StaticLog)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SigningFailure);
    }

    #[test]
    fn test_custom_builder_id() {
        let signer = recording_signer();
        let attestor = Attestor::new(&NilContextProvider, &signer, &StaticLog)
            .with_builder_id("https://example.com/builder@v1");
        assert_eq!(attestor.builder_id(), "https://example.com/builder@v1");

        let bundle = attestor.build_and_sign(&two_subjects()).unwrap();
        let statement = bundle.statement().unwrap();
        assert_eq!(
            statement["predicate"]["runDetails"]["builder"]["id"],
            "https://example.com/builder@v1"
        );
    }

    #[test]
    fn test_bundle_json_line() {
        let bundle =
            build_and_sign(&two_subjects(), &NilContextProvider, &recording_signer(), &StaticLog)
                .unwrap();

        let line = bundle.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value["dsseEnvelope"]["payloadType"].is_string());
        assert!(value["verificationMaterial"]["tlogEntries"].is_array());

        assert_eq!(SignedBundle::from_json_line(&line).unwrap(), bundle);
    }
}
