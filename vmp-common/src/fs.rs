//! Filesystem helpers

use crate::Result;
use std::path::Path;

/// Create a directory (and any missing parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
