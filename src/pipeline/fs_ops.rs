use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Write `bytes` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

pub fn is_ani_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("ani"))
        .unwrap_or(false)
}
