//! # in-toto Statement Generation
//!
//! Builds in-toto v1 Statements over a list of resource descriptors and wraps
//! the serialized statement into an unsigned DSSE envelope. Signing is left to
//! a [`crate::signing::Signer`] so the envelope can be signed by whatever key
//! material the caller supplies.
//!
//! ## Examples
//!
//! ```
//! use generic_attest::in_toto::{generate_statement_envelope, json_to_struct_proto, make_resource_descriptor};
//! use std::collections::BTreeMap;
//!
//! let digests = BTreeMap::from([("sha256".to_string(), "abc123".to_string())]);
//! let subject = make_resource_descriptor("artifact.bin", &digests);
//!
//! let predicate = json_to_struct_proto(r#"{"buildType": "example"}"#).unwrap();
//! let envelope = generate_statement_envelope(
//!     &[subject],
//!     "https://slsa.dev/provenance/v1",
//!     &predicate,
//! ).unwrap();
//!
//! assert!(envelope.signatures().is_empty());
//! ```

use crate::error::{Error, Result};

use in_toto_attestation::v1::resource_descriptor::ResourceDescriptor;
use protobuf::MessageFull;
use protobuf::well_known_types::struct_::Struct;
use protobuf_json_mapping::{parse_from_str, print_to_string};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};

pub mod dsse;

use dsse::Envelope;

pub const DSSE_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

pub const STATEMENT_TYPE_V1: &str = "https://in-toto.io/Statement/v1";

/// Converts a JSON string to a protobuf Struct.
///
/// Predicates are carried as `google.protobuf.Struct`, so any JSON object can
/// be used as a predicate body.
///
/// ```
/// use generic_attest::in_toto::json_to_struct_proto;
///
/// let struct_proto = json_to_struct_proto(r#"{"name": "test", "version": "1.0"}"#).unwrap();
/// assert_eq!(struct_proto.fields.len(), 2);
/// ```
pub fn json_to_struct_proto(json_str: &str) -> Result<Struct> {
    let msg_struct = parse_from_str::<Struct>(json_str).map_err(|e| {
        Error::Serialization(format!("Failed to convert JSON to protobuf Struct: {}", e))
    })?;

    Ok(msg_struct)
}

/// Same as [`json_to_struct_proto`] for an already-parsed JSON value.
pub fn value_to_struct_proto(value: &serde_json::Value) -> Result<Struct> {
    json_to_struct_proto(&value.to_string())
}

/// Creates a resource descriptor carrying a name and a full digest set.
pub fn make_resource_descriptor(name: &str, digests: &BTreeMap<String, String>) -> ResourceDescriptor {
    let digest_set: HashMap<String, String> = digests
        .iter()
        .map(|(alg, digest)| (alg.clone(), digest.clone()))
        .collect();

    let mut rd = ResourceDescriptor::new();
    rd.name = name.to_string();
    rd.digest = digest_set;

    rd
}

/// Generates an in-toto Statement v1 and returns its JSON serialization.
///
/// All subjects go into a single statement. The statement is assembled from
/// the protobuf JSON of each descriptor and of the predicate rather than via
/// `Statement::validate`, which refuses an empty subject list.
pub fn generate_statement_payload(
    subject: &[ResourceDescriptor],
    predicate_type: &str,
    predicate: &Struct,
) -> Result<Vec<u8>> {
    if predicate_type.is_empty() {
        return Err(Error::Validation(
            "in-toto statement requires a predicate type".to_string(),
        ));
    }

    let mut subjects = Vec::with_capacity(subject.len());
    for rd in subject {
        if rd.name.is_empty() || rd.digest.is_empty() {
            return Err(Error::Validation(format!(
                "in-toto subject '{}' requires a name and at least one digest",
                rd.name
            )));
        }
        subjects.push(proto_to_value(rd)?);
    }

    let statement = json!({
        "_type": STATEMENT_TYPE_V1,
        "subject": subjects,
        "predicateType": predicate_type,
        "predicate": proto_to_value(predicate)?,
    });

    serde_json::to_vec(&statement).map_err(|e| Error::Serialization(e.to_string()))
}

fn proto_to_value<M: MessageFull>(message: &M) -> Result<Value> {
    let json_str = print_to_string(message).map_err(|e| Error::Serialization(e.to_string()))?;
    serde_json::from_str(&json_str).map_err(|e| Error::Serialization(e.to_string()))
}

/// Generates an in-toto Statement v1 wrapped in an unsigned DSSE envelope.
pub fn generate_statement_envelope(
    subject: &[ResourceDescriptor],
    predicate_type: &str,
    predicate: &Struct,
) -> Result<Envelope> {
    let payload = generate_statement_payload(subject, predicate_type, predicate)?;
    Ok(Envelope::new(&payload, DSSE_PAYLOAD_TYPE.to_string()))
}
