//! Manifest splitting.

/// Split a manifest blob into entries.
///
/// Entries are separated by any of NUL, CR or LF; empty entries are dropped.
pub fn split_listfile(data: &[u8]) -> Vec<String> {
    data.split(|&b| matches!(b, b'\0' | b'\r' | b'\n'))
        .filter(|entry| !entry.is_empty())
        .map(|entry| String::from_utf8_lossy(entry).into_owned())
        .collect()
}

/// Split manifest text (exclusion lists, listfiles) the same way.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    split_listfile(text.as_bytes())
}
