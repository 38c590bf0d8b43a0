//! # Subject Parsing
//!
//! Turns the base64-encoded output of a digest tool (`sha256sum` style,
//! `<digest><whitespace><name>` per line) into an ordered, duplicate-free
//! list of attestation subjects.
//!
//! ```
//! use base64::Engine;
//! use base64::engine::general_purpose::STANDARD;
//! use generic_attest::subjects::parse_subjects;
//!
//! let text = "2e0390eb024a52963db7b95e84a9c2b12c004054a7bad9a97ec0c7c89d4681d2  hoge\n";
//! let subjects = parse_subjects(&STANDARD.encode(text)).unwrap();
//!
//! assert_eq!(subjects.len(), 1);
//! assert_eq!(subjects.names().collect::<Vec<_>>(), vec!["hoge"]);
//! ```

use crate::error::SubjectError;
use crate::hash::{HashAlgorithm, is_hex_digest};
use crate::in_toto;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use in_toto_attestation::v1::resource_descriptor::ResourceDescriptor;
use log::debug;
use std::collections::{BTreeMap, HashSet};

/// An artifact identified by name and one or more content digests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    /// algorithm name -> lowercase hex digest
    pub digests: BTreeMap<String, String>,
}

impl Subject {
    pub fn sha256(name: &str, digest: &str) -> Self {
        Self {
            name: name.to_string(),
            digests: BTreeMap::from([(
                HashAlgorithm::Sha256.as_str().to_string(),
                digest.to_string(),
            )]),
        }
    }

    pub fn to_resource_descriptor(&self) -> ResourceDescriptor {
        in_toto::make_resource_descriptor(&self.name, &self.digests)
    }
}

/// Subjects in order of first appearance in the input. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectList {
    subjects: Vec<Subject>,
}

impl SubjectList {
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.name.as_str())
    }

    pub fn as_slice(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn to_resource_descriptors(&self) -> Vec<ResourceDescriptor> {
        self.subjects
            .iter()
            .map(Subject::to_resource_descriptor)
            .collect()
    }

    /// Re-serializes the list in the checksum format accepted by
    /// [`parse_subjects`] (before base64 encoding).
    pub fn to_checksum_text(&self) -> String {
        let sha256 = HashAlgorithm::Sha256.as_str();
        self.subjects
            .iter()
            .filter_map(|s| {
                s.digests
                    .get(sha256)
                    .map(|digest| format!("{digest}  {}\n", s.name))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SubjectList {
    type Item = &'a Subject;
    type IntoIter = std::slice::Iter<'a, Subject>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.iter()
    }
}

/// Parses base64-encoded checksum-list text into a [`SubjectList`].
///
/// Line breaks inside the base64 text are ignored, so wrapped output of
/// `base64` is accepted. Blank lines are skipped. The digest is separated from the name by the
/// first run of whitespace; whitespace inside the name is kept as is. The
/// first invalid line aborts the whole parse.
pub fn parse_subjects(input: &str) -> Result<SubjectList, SubjectError> {
    let unwrapped: String = input.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let decoded = STANDARD
        .decode(unwrapped)
        .map_err(|e| SubjectError::Base64(e.to_string()))?;
    let text = String::from_utf8(decoded).map_err(|e| SubjectError::Base64(e.to_string()))?;

    let mut subjects = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (digest, rest) = trimmed
            .split_once(char::is_whitespace)
            .ok_or(SubjectError::NoName { line: line_no })?;
        let name = rest.trim();
        if name.is_empty() {
            return Err(SubjectError::NoName { line: line_no });
        }

        if !is_hex_digest(digest, &HashAlgorithm::Sha256) {
            return Err(SubjectError::Sha {
                line: line_no,
                digest: digest.to_string(),
            });
        }

        if !seen.insert(name.to_string()) {
            return Err(SubjectError::DuplicateSubject {
                line: line_no,
                name: name.to_string(),
            });
        }

        debug!("subject '{name}' sha256:{digest}");
        subjects.push(Subject::sha256(name, digest));
    }

    Ok(SubjectList { subjects })
}
