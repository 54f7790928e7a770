//! Asset name handling.
//!
//! Archives address members with backslash separators while command tables,
//! exclusion lists and output paths use forward slashes.

use std::path::{Path, PathBuf};

/// Normalize an asset name to its lookup key (`\` becomes `/`).
pub fn normalize_name(name: &str) -> String {
    name.replace('\\', "/")
}

/// Convert an asset name to the form used for archive reads (`/` becomes `\`).
pub fn archive_path(name: &str) -> String {
    name.replace('/', "\\")
}

/// Output path mirroring a normalized asset name under `root`.
pub fn mirrored_path(root: &Path, normalized: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in normalized.split('/').filter(|c| !c.is_empty()) {
        path.push(component);
    }
    path
}

/// Split a normalized name into its parent directory and file name.
pub fn split_parent(normalized: &str) -> (&str, &str) {
    match normalized.rfind('/') {
        Some(i) => (&normalized[..i], &normalized[i + 1..]),
        None => ("", normalized),
    }
}

/// File name without its extension.
pub fn file_stem(normalized: &str) -> &str {
    let (_, file) = split_parent(normalized);
    match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    }
}

/// Replace the file name of a normalized name, keeping its directory.
pub fn with_file_name(normalized: &str, file_name: &str) -> String {
    match split_parent(normalized) {
        ("", _) => file_name.to_string(),
        (parent, _) => format!("{}/{}", parent, file_name),
    }
}

/// Replace (or add) the extension of a normalized name.
pub fn with_extension(normalized: &str, extension: &str) -> String {
    with_file_name(normalized, &format!("{}.{}", file_stem(normalized), extension))
}
