//! Constructors for the SLSA v1 provenance protobuf messages.
//!
//! Each takes its parts by value and moves them into the message; optional
//! parts that are absent stay unset so they are omitted from the JSON form.

use in_toto_attestation::predicates::provenance::v1::provenance::{
    BuildDefinition, BuildMetadata, Builder, Provenance, RunDetails,
};
use in_toto_attestation::v1::resource_descriptor::ResourceDescriptor;
use protobuf::MessageField;
use protobuf::well_known_types::struct_::Struct;
use protobuf::well_known_types::timestamp::Timestamp;

pub fn make_build_definition_v1(
    build_type: &str,
    external_parameters: Struct,
    internal_parameters: Option<Struct>,
    resolved_dependencies: Vec<ResourceDescriptor>,
) -> BuildDefinition {
    let mut build_def = BuildDefinition::new();
    build_def.build_type = build_type.to_string();
    build_def.external_parameters = MessageField::some(external_parameters);
    // optional for all SLSA Build levels
    build_def.internal_parameters = internal_parameters.into();
    build_def.resolved_dependencies = resolved_dependencies;

    build_def
}

pub fn make_build_metadata_v1(
    invocation_id: Option<String>,
    started_on: Option<Timestamp>,
    finished_on: Option<Timestamp>,
) -> BuildMetadata {
    let mut metadata = BuildMetadata::new();
    metadata.invocation_id = invocation_id.unwrap_or_default();
    metadata.started_on = started_on.into();
    metadata.finished_on = finished_on.into();

    metadata
}

/// Run details for `builder_id`. The builder carries no version or
/// dependencies of its own.
pub fn make_run_details_v1(builder_id: &str, metadata: BuildMetadata) -> RunDetails {
    let mut builder = Builder::new();
    builder.id = builder_id.to_string();

    let mut run_details = RunDetails::new();
    run_details.builder = MessageField::some(builder);
    run_details.metadata = MessageField::some(metadata);

    run_details
}

pub fn generate_build_provenance_v1(
    build_definition: BuildDefinition,
    run_details: RunDetails,
) -> Provenance {
    let mut provenance = Provenance::new();
    provenance.build_definition = MessageField::some(build_definition);
    provenance.run_details = MessageField::some(run_details);

    provenance
}
