//! # Build Context
//!
//! Build-context metadata describes the CI run that produced the artifacts.
//! It is obtained through a [`ContextProvider`]; the production provider reads
//! the JSON document GitHub Actions exposes as `${{ toJSON(github) }}` from an
//! environment variable.

use crate::error::{Error, Result};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

/// Environment variable holding the build-context JSON.
pub const GITHUB_CONTEXT_VAR: &str = "GITHUB_CONTEXT";

/// Subset of the GitHub workflow context used in provenance.
///
/// Every field is optional so that `{}` is a valid, if uninformative, context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub workflow_ref: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub run_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub run_attempt: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub repository_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub repository_owner_id: Option<String>,
}

// GitHub serializes ids as strings but hand-written contexts often use numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}

impl BuildContext {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Context(format!("Malformed build context: {e}")))
    }

    /// `https://github.com/owner/repo` style URL of the source repository.
    pub fn repository_uri(&self) -> Option<String> {
        let repository = self.repository.as_deref()?;
        let server = self.server_url.as_deref().unwrap_or("https://github.com");
        Some(format!("{}/{}", server.trim_end_matches('/'), repository))
    }

    /// Unique identifier of this run attempt.
    pub fn invocation_id(&self) -> Option<String> {
        let repo_uri = self.repository_uri()?;
        let run_id = self.run_id.as_deref()?;
        let attempt = self.run_attempt.as_deref().unwrap_or("1");
        Some(format!("{repo_uri}/actions/runs/{run_id}/attempts/{attempt}"))
    }

    /// Path of the workflow file, taken from `workflow_ref`
    /// (`owner/repo/.github/workflows/x.yml@refs/heads/main`).
    pub fn workflow_path(&self) -> Option<String> {
        let workflow_ref = self.workflow_ref.as_deref()?;
        let repository = self.repository.as_deref()?;
        let without_ref = workflow_ref.split('@').next()?;
        without_ref
            .strip_prefix(repository)
            .map(|p| p.trim_start_matches('/').to_string())
    }
}

/// A capability that returns build-context metadata.
///
/// A missing or malformed context is a fatal error; implementations are not
/// retried.
pub trait ContextProvider {
    fn build_context(&self) -> Result<BuildContext>;
}

/// Reads the build context from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvContextProvider {
    var: String,
}

impl EnvContextProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    /// Parses an already-read value of the variable.
    pub fn parse(&self, raw: Option<String>) -> Result<BuildContext> {
        let raw = raw.ok_or_else(|| {
            Error::Context(format!("Environment variable {} is not set", self.var))
        })?;
        debug!("read {} bytes of build context from {}", raw.len(), self.var);
        BuildContext::from_json(&raw)
    }
}

impl Default for EnvContextProvider {
    fn default() -> Self {
        Self::new(GITHUB_CONTEXT_VAR)
    }
}

impl ContextProvider for EnvContextProvider {
    fn build_context(&self) -> Result<BuildContext> {
        self.parse(std::env::var(&self.var).ok())
    }
}

/// Provides an empty context. Useful outside CI and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NilContextProvider;

impl ContextProvider for NilContextProvider {
    fn build_context(&self) -> Result<BuildContext> {
        Ok(BuildContext::default())
    }
}
