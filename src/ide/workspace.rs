//! Workspace root normalization.
//!
//! Editors hand over roots as plain paths or `file://` URIs. Both map to one
//! posix-style key so the cache sees a single slot per workspace.

use std::path::PathBuf;

use percent_encoding::percent_decode_str;

const FILE_SCHEME: &str = "file://";

/// Turn a path or `file://` URI into a filesystem path string.
///
/// UNC hosts are kept as `//host/share`, and the leading slash of a Windows drive
/// (`/C:/...`) is dropped.
pub fn workspace_path(root: &str) -> Option<PathBuf> {
    let root = root.trim();
    if root.is_empty() {
        return None;
    }

    let Some(rest) = root.strip_prefix(FILE_SCHEME) else {
        return Some(PathBuf::from(root));
    };

    let (host, path) = match rest.find('/') {
        Some(0) => ("", rest),
        Some(index) => (&rest[..index], &rest[index..]),
        None => (rest, ""),
    };

    let mut path = percent_decode_str(path).decode_utf8_lossy().into_owned();
    if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
        path = format!("//{host}{path}");
    }

    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' {
        path.remove(0);
    }

    if path.is_empty() {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Cache key for a workspace root. Lowercased on Windows.
///
/// ```
/// use synesis::ide::workspace_key;
///
/// assert_eq!(
///     workspace_key("file:///home/ana/my%20thesis/").as_deref(),
///     Some("/home/ana/my thesis")
/// );
/// ```
pub fn workspace_key(root: &str) -> Option<String> {
    let path = workspace_path(root)?;
    let mut key = path.to_string_lossy().replace('\\', "/");
    while key.len() > 1 && key.ends_with('/') {
        key.pop();
    }
    if cfg!(windows) {
        key = key.to_lowercase();
    }
    Some(key)
}
