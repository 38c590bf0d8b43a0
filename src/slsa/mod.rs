//! # SLSA Build Provenance
//!
//! Generates SLSA v1 build provenance predicates. The [`generators`] module
//! holds the low-level constructors for the provenance protobuf messages;
//! [`provenance`] assembles them from a [`crate::context::BuildContext`].
//!
//! SLSA provenance records what was built (the statement subjects), how it was
//! built (build type and parameters), who built it (builder identity) and when
//! (build metadata).
//!
//! ```
//! use generic_attest::context::BuildContext;
//! use generic_attest::slsa::provenance::{GENERIC_BUILDER_ID, generate_provenance_predicate};
//!
//! let predicate = generate_provenance_predicate(&BuildContext::default(), GENERIC_BUILDER_ID).unwrap();
//! assert!(predicate.fields.contains_key("buildDefinition"));
//! ```
pub mod generators;
pub mod provenance;

/// The SLSA v1 build provenance in-toto predicate type URI.
///
/// ```
/// use generic_attest::slsa::BUILD_PROVENANCE_PREDICATE_TYPE_V1;
///
/// assert_eq!(BUILD_PROVENANCE_PREDICATE_TYPE_V1, "https://slsa.dev/provenance/v1");
/// ```
pub const BUILD_PROVENANCE_PREDICATE_TYPE_V1: &str = "https://slsa.dev/provenance/v1";
