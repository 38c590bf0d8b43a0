use crate::attest::SignedBundle;
use crate::context::{BuildContext, ContextProvider};
use crate::error::{Error, Result};
use crate::signing::{Signer, SigningOutput};
use crate::tlog::{LogEntryRef, SignedStatement, TransparencyLog};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub const DIGEST_1: &str = "5b3513f580c8397212ff2c8f459c199efc0c90e4354a5f3533adf0a3fff3a530";
pub const DIGEST_2: &str = "8b3513f580c8397212ff2c8f459c199efc0c90e4354a5f3533adf0a3fff3a530";

/// Base64 of `sha256sum` style output for the given `(digest, name)` pairs.
pub fn encode_subjects(entries: &[(&str, &str)]) -> String {
    let text: String = entries
        .iter()
        .map(|(digest, name)| format!("{digest}  {name}\n"))
        .collect();
    STANDARD.encode(text)
}

pub fn read_bundles(path: &Path) -> Vec<SignedBundle> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| SignedBundle::from_json_line(line).unwrap())
        .collect()
}

pub fn dir_entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

pub struct MockContextProvider {
    ctx: BuildContext,
}

impl MockContextProvider {
    pub fn new(ctx: BuildContext) -> Self {
        Self { ctx }
    }
}

impl ContextProvider for MockContextProvider {
    fn build_context(&self) -> Result<BuildContext> {
        Ok(self.ctx.clone())
    }
}

/// Records every message it is asked to sign.
pub struct MockSigner {
    signed: Mutex<Vec<Vec<u8>>>,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.signed.lock().unwrap().len()
    }
}

impl Signer for MockSigner {
    fn sign(&self, data: &[u8]) -> Result<SigningOutput> {
        self.signed.lock().unwrap().push(data.to_vec());
        Ok(SigningOutput {
            sig: b"mock-signature".to_vec(),
            keyid: "mock-key".to_string(),
            certificate: "-----BEGIN CERTIFICATE-----\nmock\n-----END CERTIFICATE-----\n"
                .to_string(),
        })
    }
}

pub struct FailingSigner;

impl Signer for FailingSigner {
    fn sign(&self, _data: &[u8]) -> Result<SigningOutput> {
        Err(Error::Signing("signing service unavailable".to_string()))
    }
}

/// Keeps recorded envelopes in memory and hands out sequential indexes.
pub struct MockTransparencyLog {
    entries: Mutex<Vec<Vec<u8>>>,
}

impl MockTransparencyLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl TransparencyLog for MockTransparencyLog {
    fn record(&self, statement: &SignedStatement<'_>) -> Result<LogEntryRef> {
        let mut entries = self.entries.lock().unwrap();
        entries.push(statement.envelope.payload().to_vec());
        let index = entries.len() as i64 - 1;

        Ok(LogEntryRef {
            uuid: format!("mock-uuid-{index}"),
            log_index: index,
            integrated_time: 1_700_000_000 + index,
            log_id: "mock-log".to_string(),
            url: format!("mock://entries/mock-uuid-{index}"),
        })
    }
}

pub struct FailingLog;

impl TransparencyLog for FailingLog {
    fn record(&self, _statement: &SignedStatement<'_>) -> Result<LogEntryRef> {
        // a collaborator surfacing a transport error as plain IO
        Err(std::io::Error::other("connection reset").into())
    }
}
