pub mod commands;
pub mod handlers;
use crate::error::{Error, PathError, SubjectError};

// Re-export commonly used items
pub use commands::{AttestArgs, HashAlgorithmChoice};
pub use handlers::handle_attest_command;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLI_NAME: &str = "generic-attest";

pub fn format_error(error: &Error) -> String {
    match error {
        Error::Io(err) => format!("IO error: {err}"),
        Error::Subject(err) => match err {
            SubjectError::Base64(msg) => format!("Invalid subjects: not valid base64 ({msg})"),
            SubjectError::NoName { line } => {
                format!("Invalid subjects: line {line} has a digest but no artifact name")
            }
            SubjectError::Sha { line, digest } => {
                format!("Invalid subjects: line {line} has a malformed sha256 digest '{digest}'")
            }
            SubjectError::DuplicateSubject { line, name } => {
                format!("Invalid subjects: '{name}' on line {line} is listed more than once")
            }
        },
        Error::InvalidPath(err) => match err {
            PathError::InvalidExtension(path) => format!(
                "Invalid attestation path '{}': file name must end with .intoto.jsonl",
                path.display()
            ),
            PathError::EscapesRoot { path, root } => format!(
                "Invalid attestation path '{}': must be inside '{}'",
                path.display(),
                root.display()
            ),
            PathError::SymlinkDestination(path) => format!(
                "Invalid attestation path '{}': refusing to write through a symbolic link",
                path.display()
            ),
        },
        Error::Context(msg) => format!("Build context error: {msg}"),
        Error::Signing(msg) => format!("Signing error: {msg}"),
        Error::TransparencyLog(msg) => format!("Transparency log error: {msg}"),
        Error::Serialization(msg) => format!("Serialization error: {msg}"),
        Error::Validation(msg) => format!("Validation error: {msg}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
        Error::Json(err) => format!("JSON error: {err}"),
    }
}
