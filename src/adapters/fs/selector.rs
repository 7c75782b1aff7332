use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::core::errors::{BackupError, Result};

const SECONDS_PER_DAY: u64 = 86_400;

/// Collect regular files under `root` modified within the last
/// `window_days` days.
///
/// Returns absolute paths in sorted order. Symlinks are not followed.
/// Anything at or below a path in `exclude` is skipped. Entries that vanish or cannot be stat'ed during the
/// walk are skipped with a warning; content is read later by the hasher,
/// which is strict.
pub fn select_modified_files(
    root: &Path,
    window_days: u32,
    exclude: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(BackupError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }
    let root = root.canonicalize()?;
    let window = Duration::from_secs(u64::from(window_days) * SECONDS_PER_DAY);
    let cutoff = SystemTime::now()
        .checked_sub(window)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let excluded: Vec<PathBuf> = exclude
        .iter()
        .filter_map(|p| resolve_exclusion(p))
        .filter(|p| p.starts_with(&root))
        .collect();

    let mut selected = Vec::new();
    let walker = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !excluded.iter().any(|x| e.path().starts_with(x)));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let modified = entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|m| m.modified());
        let modified = match modified {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "skipping file without mtime");
                continue;
            }
        };

        if modified > cutoff {
            selected.push(entry.into_path());
        }
    }

    selected.sort();
    tracing::debug!(
        root = %root.display(),
        window_days,
        count = selected.len(),
        "selected modified files"
    );
    Ok(selected)
}

/// Absolute, symlink-free form of `path`. A path that does not exist yet
/// is resolved through its parent; `None` if neither exists.
fn resolve_exclusion(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Some(resolved);
    }
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    parent.canonicalize().ok().map(|p| p.join(name))
}
