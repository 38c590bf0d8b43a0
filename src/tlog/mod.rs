//! # Transparency Log
//!
//! The attestation pipeline records every signed statement in an append-only
//! transparency log before a bundle is emitted. [`TransparencyLog`] is the
//! capability it records through; [`rekor::RekorLog`] is the production
//! client.

use crate::error::Result;
use crate::in_toto::dsse::Envelope;

use serde::{Deserialize, Serialize};

pub mod rekor;

pub use rekor::RekorLog;

/// A signed statement as submitted to the log.
#[derive(Debug, Clone, Copy)]
pub struct SignedStatement<'a> {
    pub envelope: &'a Envelope,
    /// PEM certificate or public key verifying the envelope signatures.
    pub certificate: &'a str,
}

/// Reference to the log entry that records a signed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryRef {
    pub uuid: String,
    pub log_index: i64,
    pub integrated_time: i64,
    pub log_id: String,
    pub url: String,
}

pub trait TransparencyLog {
    fn record(&self, statement: &SignedStatement<'_>) -> Result<LogEntryRef>;
}
