//! Processing of whole definition documents and directories of them
//!
//! A document is a JSON object with a `vars` array of variable definitions
//! and an optional, ignored, `description`:
//!
//! ```json
//! {
//!     "description": "system variables",
//!     "vars": [
//!         { "name": "/sys/test/a", "type": "uint16", "value": "42" }
//!     ]
//! }
//! ```

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::driver::create_from_value;
use crate::error::VarCreateError;
use crate::options::CreateOptions;
use crate::outcome::Outcome;
use crate::registry::Registry;

/// Documents larger than this are rejected before being read
pub const MAX_DOCUMENT_SIZE: u64 = 256 * 1024;

/// Create every variable defined in a JSON document
///
/// A document that is not valid JSON or has no `vars` array fails as a
/// whole. Otherwise every definition is attempted and the returned outcome
/// carries the last failure, if any.
pub fn create_from_str<R: Registry>(
    registry: &mut R,
    source: &str,
    options: &CreateOptions,
) -> Result<Outcome, VarCreateError> {
    let document: Value =
        serde_json::from_str(source).map_err(|err| VarCreateError::malformed(source, &err))?;

    let vars = document
        .get("vars")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            VarCreateError::InvalidArgument("document has no 'vars' array".to_string())
        })?;

    let mut outcome = Outcome::new();
    for (index, vardata) in vars.iter().enumerate() {
        let result = create_from_value(registry, vardata, options);
        if let Err(err) = &result {
            warn!(index, "variable definition failed: {err}");
        }
        outcome.record(result);
    }
    Ok(outcome)
}

/// Read a definition document, refusing anything that is not a regular file
/// or is larger than [`MAX_DOCUMENT_SIZE`]
pub fn read_document(path: &Path) -> Result<String, VarCreateError> {
    let io_error = |source: io::Error| match source.kind() {
        io::ErrorKind::NotFound => VarCreateError::NotFound {
            path: path.to_path_buf(),
        },
        _ => VarCreateError::Io {
            path: path.to_path_buf(),
            source,
        },
    };

    let metadata = fs::metadata(path).map_err(io_error)?;
    if !metadata.is_file() {
        return Err(VarCreateError::Unsupported(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(VarCreateError::too_large(
            format!("document '{}'", path.display()),
            usize::try_from(metadata.len()).unwrap_or(usize::MAX),
            MAX_DOCUMENT_SIZE as usize,
        ));
    }

    fs::read_to_string(path).map_err(io_error)
}

/// Create every variable defined in a document file
pub fn create_from_file<R: Registry>(
    registry: &mut R,
    path: &Path,
    options: &CreateOptions,
) -> Result<Outcome, VarCreateError> {
    if options.verbose {
        info!(path = %path.display(), "creating vars");
    }

    let source = read_document(path)?;
    create_from_str(registry, &source, options).inspect_err(|err| {
        if matches!(err, VarCreateError::MalformedDocument { .. }) {
            warn!("{}", err.report(&source, &path.display().to_string()));
        }
    })
}

/// Create the variables of every `*.json` file directly inside `dir`
///
/// Subdirectories and entries that cannot be inspected are skipped. Files
/// are processed in directory enumeration order; a failing file does not
/// stop the others.
pub fn create_from_dir<R: Registry>(
    registry: &mut R,
    dir: &Path,
    options: &CreateOptions,
) -> Result<Outcome, VarCreateError> {
    let entries = fs::read_dir(dir).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => VarCreateError::NotFound {
            path: dir.to_path_buf(),
        },
        _ => VarCreateError::Io {
            path: dir.to_path_buf(),
            source,
        },
    })?;

    let mut outcome = Outcome::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(dir = %dir.display(), "unable to read directory entry: {err}");
                continue;
            }
        };
        if !is_definition_file(&path) {
            continue;
        }

        match create_from_file(registry, &path, options) {
            Ok(file_outcome) => {
                if !file_outcome.is_success() {
                    warn!(path = %path.display(), "failed to create variables");
                }
                outcome.absorb(file_outcome);
            }
            Err(err) => {
                warn!(path = %path.display(), "failed to create variables: {err}");
                outcome.fail(err);
            }
        }
    }
    Ok(outcome)
}

/// Non-directory entries whose name ends in `.json`
fn is_definition_file(path: &Path) -> bool {
    let has_suffix = path
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.ends_with(".json"));
    if !has_suffix {
        return false;
    }
    match fs::metadata(path) {
        Ok(metadata) => !metadata.is_dir(),
        Err(err) => {
            warn!(path = %path.display(), "unable to stat file: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::MemoryRegistry;

    #[test]
    fn test_document_without_vars() {
        let mut registry = MemoryRegistry::new();
        let err = create_from_str(&mut registry, r#"{"description": "x"}"#, &CreateOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = create_from_str(&mut registry, r#"{"vars": {}}"#, &CreateOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_malformed_document() {
        let mut registry = MemoryRegistry::new();
        let err = create_from_str(&mut registry, r#"{"vars": [}"#, &CreateOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_empty_vars_is_success() {
        let mut registry = MemoryRegistry::new();
        let outcome = create_from_str(&mut registry, r#"{"vars": []}"#, &CreateOptions::new())
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.succeeded(), 0);
    }

    #[test]
    fn test_continues_past_failing_entries() {
        let mut registry = MemoryRegistry::new();
        let source = r#"{
            "vars": [
                { "name": "/a", "type": "uint16" },
                { "name": "/b", "type": "nonsense" },
                { "name": "/c", "type": "int32" }
            ]
        }"#;
        let outcome = create_from_str(&mut registry, source, &CreateOptions::new()).unwrap();
        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(outcome.failed(), 1);
        assert!(registry.lookup("/c").is_some());
        assert_eq!(outcome.into_result().unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_read_missing_document() {
        let err = read_document(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_read_directory_as_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_oversized_document_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        fs::write(&path, vec![b' '; MAX_DOCUMENT_SIZE as usize + 1]).unwrap();
        let err = read_document(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooLarge);
    }

    #[test]
    fn test_missing_directory() {
        let mut registry = MemoryRegistry::new();
        let err = create_from_dir(
            &mut registry,
            Path::new("/definitely/not/here"),
            &CreateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
