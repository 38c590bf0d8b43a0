use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::in_toto::value_to_struct_proto;
use crate::slsa::generators;

use in_toto_attestation::to_struct;
use in_toto_attestation::v1::resource_descriptor::ResourceDescriptor;
use protobuf::well_known_types::struct_::Struct;
use protobuf::well_known_types::timestamp::Timestamp;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Build type of provenance produced for arbitrary artifacts.
pub const GENERIC_BUILD_TYPE: &str =
    "https://github.com/slsa-framework/slsa-github-generator/generic@v1";

/// Default builder identity recorded in `runDetails.builder.id`.
pub const GENERIC_BUILDER_ID: &str =
    "https://github.com/slsa-framework/slsa-github-generator/.github/workflows/generator_generic_slsa3.yml";

fn insert_some(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value));
    }
}

fn external_parameters(ctx: &BuildContext) -> Result<Struct> {
    let mut workflow = Map::new();
    insert_some(&mut workflow, "ref", ctx.git_ref.clone());
    insert_some(&mut workflow, "repository", ctx.repository_uri());
    insert_some(&mut workflow, "path", ctx.workflow_path());

    let mut params = Map::new();
    if !workflow.is_empty() {
        params.insert("workflow".to_string(), Value::Object(workflow));
    }

    value_to_struct_proto(&Value::Object(params))
}

fn internal_parameters(ctx: &BuildContext) -> Result<Option<Struct>> {
    let mut github = Map::new();
    insert_some(&mut github, "event_name", ctx.event_name.clone());
    insert_some(&mut github, "repository_id", ctx.repository_id.clone());
    insert_some(&mut github, "repository_owner_id", ctx.repository_owner_id.clone());

    if github.is_empty() {
        return Ok(None);
    }

    let mut params = Map::new();
    params.insert("github".to_string(), Value::Object(github));
    value_to_struct_proto(&Value::Object(params)).map(Some)
}

fn source_dependency(ctx: &BuildContext) -> Option<ResourceDescriptor> {
    let repo_uri = ctx.repository_uri()?;
    let sha = ctx.sha.as_deref()?;

    let mut rd = ResourceDescriptor::new();
    rd.uri = match ctx.git_ref.as_deref() {
        Some(git_ref) => format!("git+{repo_uri}@{git_ref}"),
        None => format!("git+{repo_uri}"),
    };
    rd.digest = HashMap::from([("gitCommit".to_string(), sha.to_string())]);

    Some(rd)
}

/// Generates the SLSA v1 build provenance predicate for a build context.
///
/// Fields the context does not carry are left out rather than filled with
/// placeholders.
pub fn generate_provenance_predicate(ctx: &BuildContext, builder_id: &str) -> Result<Struct> {
    let external = external_parameters(ctx)?;
    let internal = internal_parameters(ctx)?;

    let build_def = generators::make_build_definition_v1(
        GENERIC_BUILD_TYPE,
        external,
        internal,
        source_dependency(ctx).into_iter().collect(),
    );

    let metadata =
        generators::make_build_metadata_v1(ctx.invocation_id(), None, Some(Timestamp::now()));
    let run_details = generators::make_run_details_v1(builder_id, metadata);

    let provenance = generators::generate_build_provenance_v1(build_def, run_details);
    to_struct(&provenance).map_err(|e| Error::Serialization(e.to_string()))
}
