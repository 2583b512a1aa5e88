//! Document discovery and file reading.
//!
//! Schema documents are small text files; they are read whole. Discovery
//! expands a glob pattern such as `docs/*.txt` into a sorted file list.

use crate::error::{IoError, Result};
use std::path::{Path, PathBuf};

/// Maximum document size to read into memory (16MB).
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Reads a document into a string.
///
/// # Errors
///
/// Returns an error if the file does not exist, is too large, or is not
/// valid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use sqlrag_rs::io::read_file;
///
/// let content = read_file("docs/schema.txt").unwrap();
/// ```
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    let size = std::fs::metadata(path_ref)
        .map_err(|e| IoError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?
        .len();

    if size > MAX_FILE_SIZE {
        return Err(IoError::ReadFailed {
            path: path_str,
            reason: format!("file too large: {size} bytes (max: {MAX_FILE_SIZE} bytes)"),
        }
        .into());
    }

    std::fs::read_to_string(path_ref).map_err(|e| {
        IoError::ReadFailed {
            path: path_str,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Writes content to a file, creating parent directories if needed.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| IoError::WriteFailed {
            path: parent.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
    }

    std::fs::write(path_ref, content).map_err(|e| IoError::WriteFailed {
        path: path_str,
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Expands a glob pattern into a sorted list of regular files.
///
/// A pattern that matches nothing yields an empty list.
///
/// # Errors
///
/// Returns [`IoError::InvalidPattern`] for malformed patterns and
/// [`IoError::ReadFailed`] if a matched path cannot be inspected.
pub fn discover_documents(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| IoError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IoError::ReadFailed {
            path: e.path().to_string_lossy().to_string(),
            reason: e.error().to_string(),
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_missing() {
        let result = read_file("/definitely/not/here.txt");
        assert!(matches!(
            result,
            Err(crate::Error::Io(IoError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("schema.txt");
        write_file(&path, "### customers").unwrap();
        assert_eq!(read_file(&path).unwrap(), "### customers");
    }

    #[test]
    fn test_discover_documents_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.txt"), "b").unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp.path().join("c.md"), "c").unwrap();
        std::fs::create_dir(temp.path().join("dir.txt")).unwrap();

        let pattern = format!("{}/*.txt", temp.path().display());
        let found = discover_documents(&pattern).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_discover_documents_invalid_pattern() {
        let result = discover_documents("docs/[*.txt");
        assert!(matches!(
            result,
            Err(crate::Error::Io(IoError::InvalidPattern { .. }))
        ));
    }
}
