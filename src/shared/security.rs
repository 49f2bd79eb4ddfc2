use crate::shared::error::FenceError;
use crate::shared::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Maximum size for manifests, config files and source files (10 MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum size for a downloaded distribution artifact (100 MB)
pub const MAX_ARTIFACT_SIZE: u64 = 100 * 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is checked, not its target.
///
/// # Arguments
/// * `path` - The path to validate
/// * `file_description` - Description of the file (e.g., "pyproject.toml", "config file")
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| FenceError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {} metadata: {}", file_description, e),
    })?;

    if metadata.is_symlink() {
        return Err(FenceError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} is a symbolic link", file_description),
            hint: "Symbolic links are not followed. Point at the real file instead.".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        return Err(FenceError::FileReadError {
            path: path.to_path_buf(),
            details: format!("{} is not a regular file", file_description),
        }
        .into());
    }

    Ok(())
}

/// Validates file size is within acceptable limits
///
/// # Errors
/// Returns an error if the file size exceeds the maximum
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        return Err(FenceError::SecurityError {
            path: path.to_path_buf(),
            reason: format!(
                "file is too large ({} bytes, maximum {} bytes)",
                file_size, max_size
            ),
            hint: "Add the file to the ignore patterns if it does not need to be analyzed."
                .to_string(),
        }
        .into());
    }
    Ok(())
}

/// Reads a text file after the regular-file and size checks
///
/// # Arguments
/// * `path` - The file to read
/// * `file_description` - Description used in error messages
///
/// # Errors
/// Returns an error if a check fails or the file is not valid UTF-8
pub fn read_checked_file(path: &Path, file_description: &str) -> Result<String> {
    validate_regular_file(path, file_description)?;
    let read_error = |e: std::io::Error| FenceError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {}: {}", file_description, e),
    };
    let metadata = fs::metadata(path).map_err(read_error)?;
    validate_file_size(metadata.len(), path, MAX_FILE_SIZE)?;
    let content = fs::read_to_string(path).map_err(read_error)?;
    Ok(content)
}

/// Turns an archive entry name into a relative path that stays inside the
/// extraction directory.
///
/// Returns `None` for absolute paths, `..` components and empty names.
pub fn sanitize_archive_path(name: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}
