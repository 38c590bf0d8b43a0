use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde_as(as = "serde_with::base64::Base64")]
    sig: Vec<u8>,
    #[serde(default)]
    keyid: String,
}

impl Signature {
    fn new(sig: Vec<u8>, keyid: String) -> Self {
        Self { sig, keyid }
    }

    pub fn sig(&self) -> &[u8] {
        &self.sig
    }

    pub fn keyid(&self) -> &str {
        &self.keyid
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    payload_type: String,
    #[serde_as(as = "serde_with::base64::Base64")]
    payload: Vec<u8>,
    signatures: Vec<Signature>,
}

impl Envelope {
    pub fn new(payload: &[u8], payload_type: String) -> Self {
        Self {
            payload: payload.to_vec(),
            payload_type,
            signatures: vec![],
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The bytes a DSSE signature is computed over.
    pub fn pae(&self) -> Vec<u8> {
        pae(&self.payload_type, &self.payload)
    }

    pub fn add_signature(&mut self, sig: Vec<u8>, keyid: String) -> Result<()> {
        if sig.is_empty() {
            return Err(Error::Signing("DSSE signature cannot be empty".to_string()));
        }

        self.signatures.push(Signature::new(sig, keyid));

        Ok(())
    }

    pub fn validate(&self) -> bool {
        // check for required envelope fields
        if self.payload.is_empty() || self.payload_type.is_empty() || self.signatures.is_empty() {
            return false;
        }

        self.signatures.iter().all(|s| !s.sig.is_empty())
    }
}

/// Pre-Authentication Encoding:
/// `DSSEv1 <len(type)> <type> <len(body)> <body>`
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(payload_type.len() + payload.len() + 32);

    result.extend_from_slice(b"DSSEv1 ");
    result.extend_from_slice(format!("{} ", payload_type.len()).as_bytes());
    result.extend_from_slice(payload_type.as_bytes());
    result.push(b' ');
    result.extend_from_slice(format!("{} ", payload.len()).as_bytes());
    result.extend_from_slice(payload);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pae() {
        // test vector from the DSSE protocol description
        let pae_result = pae("application/example", b"hello world");
        assert_eq!(pae_result, b"DSSEv1 19 application/example 11 hello world");
    }

    #[test]
    fn test_envelope_pae_uses_payload_type() {
        let env = Envelope::new(b"{}", "application/vnd.in-toto+json".to_string());
        assert_eq!(env.pae(), b"DSSEv1 28 application/vnd.in-toto+json 2 {}");
    }

    #[test]
    fn test_add_signature_rejects_empty() {
        let mut env = Envelope::new(b"data", "text/plain".to_string());
        let result = env.add_signature(vec![], String::new());

        assert!(matches!(result, Err(Error::Signing(_))));
        assert!(env.signatures().is_empty());
    }

    #[test]
    fn test_validate() {
        let mut env = Envelope::new(b"data", "text/plain".to_string());
        assert!(!env.validate());

        env.add_signature(vec![1, 2, 3], "key".to_string()).unwrap();
        assert!(env.validate());

        let empty_payload = Envelope::new(b"", "text/plain".to_string());
        assert!(!empty_payload.validate());
    }

    #[test]
    fn test_envelope_json_field_names() {
        let mut env = Envelope::new(b"test", "application/vnd.in-toto+json".to_string());
        env.add_signature(b"sig".to_vec(), String::new()).unwrap();

        let json: serde_json::Value = serde_json::to_value(&env).unwrap();
        assert_eq!(json["payloadType"], "application/vnd.in-toto+json");
        assert_eq!(json["payload"], "dGVzdA==");
        assert_eq!(json["signatures"][0]["sig"], "c2ln");
        assert_eq!(json["signatures"][0]["keyid"], "");
    }

    #[test]
    fn test_envelope_missing_keyid_defaults() {
        let json = r#"{"payloadType":"application/vnd.in-toto+json","payload":"dGVzdA==","signatures":[{"sig":"c2ln"}]}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();

        assert_eq!(env.payload(), b"test");
        assert_eq!(env.signatures()[0].keyid(), "");
        assert_eq!(env.signatures()[0].sig(), b"sig");
    }
}
