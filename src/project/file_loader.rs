//! Workspace file discovery.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Get the (lowercased) extension of a path, if any.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether `path` ends in one of `extensions` (case-insensitive).
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    get_extension(path)
        .is_some_and(|ext| extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(&ext)))
}

/// Recursively collect every file under `root` with one of `extensions`.
///
/// Directories named in `ignored_dirs` are not descended into. The result is sorted
/// so scans are deterministic.
pub fn collect_file_paths<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    ignored_dirs: &[S],
) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Directory not found: {}", root.display()),
        ));
    }

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let mut paths = Vec::new();

    for entry in walker.filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !ignored_dirs
                .iter()
                .any(|dir| entry.file_name().to_str() == Some(dir.as_ref()))
    }) {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    Ok(paths)
}
