//! Final document assembly and output writing.
//!
//! Splices the rendered section body into the template at the placeholder
//! token, appends the widget blocks, and writes the result atomically so a
//! failed run never leaves a partial output file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while assembling or writing the output.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("placeholder '{0}' not found in template")]
    PlaceholderMissing(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to persist output: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Replaces the placeholder in `template` with `body` and appends `widgets`.
///
/// The template must contain the placeholder; only its first occurrence is
/// replaced.
pub fn splice(
    template: &str,
    placeholder: &str,
    body: &str,
    widgets: &str,
) -> Result<String, OutputError> {
    if !template.contains(placeholder) {
        return Err(OutputError::PlaceholderMissing(placeholder.to_string()));
    }
    let mut result = template.replacen(placeholder, body, 1);
    result.push_str(widgets);
    Ok(result)
}

/// Writes `content` to `path` via a tempfile in the same directory followed
/// by a rename, overwriting any existing file.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_splice_replaces_placeholder_once() {
        let result = splice("head\n<TAG>\ntail\n", "<TAG>", "BODY", "WIDGETS").unwrap();
        assert_eq!(result, "head\nBODY\ntail\nWIDGETS");
    }

    #[test]
    fn test_splice_missing_placeholder() {
        let result = splice("no token here", "<TAG>", "BODY", "");
        assert!(matches!(result, Err(OutputError::PlaceholderMissing(_))));
    }

    #[test]
    fn test_splice_empty_widgets() {
        let result = splice("<TAG>", "<TAG>", "BODY", "").unwrap();
        assert_eq!(result, "BODY");
    }

    #[test]
    fn test_write_atomic_creates_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.rst");

        write_atomic(&path, "first").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");

        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_atomic_leaves_no_tempfile_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.rst");
        write_atomic(&path, "content").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.rst")]);
    }
}
