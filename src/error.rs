use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing a base64 checksum list into subjects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubjectError {
    #[error("subjects are not valid base64: {0}")]
    Base64(String),

    #[error("missing subject name on line {line}")]
    NoName { line: usize },

    #[error("invalid sha256 digest '{digest}' on line {line}")]
    Sha { line: usize, digest: String },

    #[error("duplicate subject '{name}' on line {line}")]
    DuplicateSubject { line: usize, name: String },
}

/// Errors produced while resolving the attestation output path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("'{}' must end with .intoto.jsonl", .0.display())]
    InvalidExtension(PathBuf),

    #[error("'{}' is outside of '{}'", .path.display(), .root.display())]
    EscapesRoot { path: PathBuf, root: PathBuf },

    #[error("'{}' is a symbolic link", .0.display())]
    SymlinkDestination(PathBuf),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("Build context error: {0}")]
    Context(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transparency log error: {0}")]
    TransparencyLog(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure that terminated the pipeline.
///
/// Callers discriminate on this instead of on error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedEncoding,
    MissingName,
    MalformedDigest,
    DuplicateSubject,
    InvalidOutputPath,
    SigningFailure,
    LoggingFailure,
    IoFailure,
    ContextFailure,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Subject(SubjectError::Base64(_)) => ErrorKind::MalformedEncoding,
            Error::Subject(SubjectError::NoName { .. }) => ErrorKind::MissingName,
            Error::Subject(SubjectError::Sha { .. }) => ErrorKind::MalformedDigest,
            Error::Subject(SubjectError::DuplicateSubject { .. }) => ErrorKind::DuplicateSubject,
            Error::InvalidPath(_) => ErrorKind::InvalidOutputPath,
            Error::Signing(_) => ErrorKind::SigningFailure,
            Error::TransparencyLog(_) => ErrorKind::LoggingFailure,
            Error::Io(_) => ErrorKind::IoFailure,
            Error::Context(_) => ErrorKind::ContextFailure,
            Error::Serialization(_)
            | Error::Validation(_)
            | Error::InitializationError(_)
            | Error::Json(_) => ErrorKind::Internal,
        }
    }
}

impl ErrorKind {
    /// Process exit code for this kind of failure. Every kind maps to a
    /// distinct non-zero value.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::MalformedEncoding => 2,
            ErrorKind::MissingName => 3,
            ErrorKind::MalformedDigest => 4,
            ErrorKind::DuplicateSubject => 5,
            ErrorKind::InvalidOutputPath => 6,
            ErrorKind::SigningFailure => 7,
            ErrorKind::LoggingFailure => 8,
            ErrorKind::IoFailure => 9,
            ErrorKind::ContextFailure => 10,
        }
    }
}
