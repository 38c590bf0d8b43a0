use crate::error::{Error, Result};
use crate::hash::{HashAlgorithm, verify_hash_with_algorithm};
use crate::tlog::{LogEntryRef, SignedStatement, TransparencyLog};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_REKOR_URL: &str = "https://rekor.sigstore.dev";

const ENTRIES_PATH: &str = "/api/v1/log/entries";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Entry as returned by `POST /api/v1/log/entries`, keyed by UUID.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RekorEntry {
    body: String,
    integrated_time: i64,
    #[serde(rename = "logID")]
    log_id: String,
    log_index: i64,
}

pub struct RekorLog {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl RekorLog {
    pub fn new_with_url(url: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {e}")))?;

        Ok(RekorLog {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entry_url(&self, uuid: &str) -> String {
        format!("{}{}/{}", self.base_url, ENTRIES_PATH, uuid)
    }
}

impl TransparencyLog for RekorLog {
    fn record(&self, statement: &SignedStatement<'_>) -> Result<LogEntryRef> {
        let proposed = proposed_dsse_entry(statement)?;
        let url = format!("{}{}", self.base_url, ENTRIES_PATH);

        info!("Uploading signed statement to {url}");
        let response = self
            .client
            .post(&url)
            .json(&proposed)
            .send()
            .map_err(|e| Error::TransparencyLog(format!("Failed to reach {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::TransparencyLog(format!(
                "Rekor rejected entry ({status}): {body}"
            )));
        }

        let entries: HashMap<String, RekorEntry> = response
            .json()
            .map_err(|e| Error::TransparencyLog(format!("Invalid Rekor response: {e}")))?;

        let entry = entry_from_response(entries, |uuid| self.entry_url(uuid))?;
        debug!("Rekor entry {} at index {}", entry.uuid, entry.log_index);

        Ok(entry)
    }
}

/// Builds a `dsse` v0.0.1 proposed entry for the given statement.
fn proposed_dsse_entry(statement: &SignedStatement<'_>) -> Result<Value> {
    let envelope = serde_json::to_string(statement.envelope)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    Ok(json!({
        "apiVersion": "0.0.1",
        "kind": "dsse",
        "spec": {
            "proposedContent": {
                "envelope": envelope,
                "verifiers": [STANDARD.encode(statement.certificate)],
            }
        }
    }))
}

/// Picks the single entry out of a Rekor response and checks that its UUID
/// carries the RFC 6962 leaf hash of the returned body.
fn entry_from_response(
    entries: HashMap<String, RekorEntry>,
    entry_url: impl Fn(&str) -> String,
) -> Result<LogEntryRef> {
    if entries.len() != 1 {
        return Err(Error::TransparencyLog(format!(
            "Expected exactly one Rekor entry, got {}",
            entries.len()
        )));
    }

    let Some((uuid, entry)) = entries.into_iter().next() else {
        return Err(Error::TransparencyLog("Empty Rekor response".to_string()));
    };

    let body = STANDARD
        .decode(&entry.body)
        .map_err(|e| Error::TransparencyLog(format!("Entry body is not base64: {e}")))?;

    // UUIDs are either the bare leaf hash or prefixed with a 16 hex tree ID
    let leaf_hash = uuid
        .len()
        .checked_sub(HashAlgorithm::Sha256.hex_len())
        .and_then(|start| uuid.get(start..))
        .ok_or_else(|| Error::TransparencyLog(format!("Malformed entry UUID: {uuid}")))?;

    let mut leaf = Vec::with_capacity(body.len() + 1);
    leaf.push(0x00);
    leaf.extend_from_slice(&body);
    if !verify_hash_with_algorithm(&leaf, leaf_hash, &HashAlgorithm::Sha256) {
        return Err(Error::TransparencyLog(format!(
            "Entry UUID {uuid} does not match the returned body"
        )));
    }

    Ok(LogEntryRef {
        url: entry_url(&uuid),
        uuid,
        log_index: entry.log_index,
        integrated_time: entry.integrated_time,
        log_id: entry.log_id,
    })
}
