//! # Attestation Output
//!
//! Resolves where a signed bundle is written and writes it. Every
//! attestation file ends in `.intoto.jsonl` and must stay inside an allowed
//! root directory. Writes go through a temporary file in the destination
//! directory that is renamed into place, so the destination is never seen
//! half-written.

use crate::attest::SignedBundle;
use crate::error::{Error, PathError, Result};
use crate::subjects::SubjectList;

use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

pub const ATTESTATION_SUFFIX: &str = ".intoto.jsonl";

/// File stem used when a bundle covers zero or several subjects.
pub const MULTIPLE_SUBJECTS_STEM: &str = "multiple";

/// `<name>.intoto.jsonl` for a single subject, `multiple.intoto.jsonl`
/// otherwise.
pub fn default_file_name(subjects: &SubjectList) -> String {
    match subjects.as_slice() {
        [only] => format!("{}{ATTESTATION_SUFFIX}", only.name),
        _ => format!("{MULTIPLE_SUBJECTS_STEM}{ATTESTATION_SUFFIX}"),
    }
}

/// Folds `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Checks an attestation path and returns it as an absolute path inside
/// `root`.
///
/// Relative paths are taken relative to `root`. The parent directory must
/// exist and is resolved through symlinks before the containment check, and
/// an existing destination must not itself be a symlink.
pub fn verify_attestation_path(path: &Path, root: &Path) -> Result<PathBuf> {
    if !path.to_string_lossy().ends_with(ATTESTATION_SUFFIX) {
        return Err(PathError::InvalidExtension(path.to_path_buf()).into());
    }

    let root = fs::canonicalize(root)?;
    let escapes = || PathError::EscapesRoot {
        path: path.to_path_buf(),
        root: root.clone(),
    };

    let lexical = normalize(&root.join(path));
    if lexical == root || !lexical.starts_with(&root) {
        return Err(escapes().into());
    }

    let (Some(parent), Some(file_name)) = (lexical.parent(), lexical.file_name()) else {
        return Err(escapes().into());
    };
    let candidate = fs::canonicalize(parent)?.join(file_name);
    if !candidate.starts_with(&root) {
        return Err(escapes().into());
    }

    match fs::symlink_metadata(&candidate) {
        Ok(meta) if meta.file_type().is_symlink() => {
            Err(PathError::SymlinkDestination(path.to_path_buf()).into())
        }
        Ok(_) => Ok(candidate),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(candidate),
        Err(e) => Err(e.into()),
    }
}

/// Resolves the destination of the attestation for `subjects`.
///
/// `explicit` is the user-supplied path, if any; otherwise the default name
/// is used. Both are validated the same way.
pub fn resolve_output_path(
    subjects: &SubjectList,
    explicit: Option<&str>,
    root: &Path,
) -> Result<PathBuf> {
    let requested = match explicit {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(default_file_name(subjects)),
    };

    let resolved = verify_attestation_path(&requested, root)?;
    debug!(
        "attestation path {} resolved to {}",
        requested.display(),
        resolved.display()
    );

    Ok(resolved)
}

/// Writes `bundle` as one JSON line to `path`.
///
/// Lines already present at `path` are kept and the new line is appended.
/// The temporary file is removed if anything fails before the rename.
pub fn write_bundle(bundle: &SignedBundle, path: &Path) -> Result<()> {
    let line = bundle.to_json_line()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;

    match fs::read(path) {
        Ok(existing) => {
            tmp.write_all(&existing)?;
            if !existing.is_empty() && !existing.ends_with(b"\n") {
                tmp.write_all(b"\n")?;
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    tmp.write_all(line.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}

/// Resolves the destination of `bundle` and writes it there.
pub fn resolve_and_write(
    bundle: &SignedBundle,
    subjects: &SubjectList,
    explicit: Option<&str>,
    root: &Path,
) -> Result<PathBuf> {
    let path = resolve_output_path(subjects, explicit, root)?;
    write_bundle(bundle, &path)?;
    info!("Attestation written to {}", path.display());

    Ok(path)
}
