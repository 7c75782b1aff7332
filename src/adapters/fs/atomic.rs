use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Directory a temp file for `path` must live in so the final rename
/// stays on one filesystem.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create a temp file next to `path`, creating the parent directory.
pub fn temp_sibling(path: &Path) -> io::Result<NamedTempFile> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent)?;
    NamedTempFile::new_in(parent)
}

fn write_temp(path: &Path, data: &[u8], owner_only: bool) -> io::Result<NamedTempFile> {
    let mut tmp = temp_sibling(path)?;
    if owner_only {
        restrict_to_owner(tmp.path())?;
    }
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    Ok(tmp)
}

/// Write `data` to `path` through a temp file and rename, replacing any
/// existing file. Readers never observe a partially written file.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = write_temp(path, data, false)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like `write_atomic`, but never replaces an existing file and restricts
/// permissions to the owner on Unix.
///
/// Returns `Ok(false)` when a file already exists at `path`.
pub fn write_new_private(path: &Path, data: &[u8]) -> io::Result<bool> {
    let tmp = write_temp(path, data, true)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> io::Result<()> {
    Ok(())
}
