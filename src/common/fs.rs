use std::{fs, path::Path};

use crate::error::{Error, Result};

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Config(format!("path exists but is not a directory: {}", path.display())));
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Error unless the file exists.
pub(crate) fn require_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        return Err(Error::MissingInput(format!("{what} file does not exist: {}", path.display())));
    }
    Ok(())
}
