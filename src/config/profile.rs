//! Per-archive conversion profile.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::registry::CommandTable;

/// Archives whose contents belong in the shared `hellfire` output directory.
const HELLFIRE_PARTS: [&str; 3] = ["hfmonk", "hfmusic", "hfvoice"];

/// Everything the walker needs to convert one archive.
///
/// Built once per archive and passed by reference; nothing in it changes
/// during the walk.
#[derive(Debug, Default)]
pub struct ArchiveProfile {
    /// Lower-cased file stem of the archive, e.g. `diabdat`.
    pub source_name: String,
    /// Name of the output directory under the output root.
    pub output_name: String,
    /// Save archives tolerate missing members.
    pub is_save: bool,
    /// Entries to walk; `None` uses the archive's own `(listfile)`.
    pub manifest: Option<Vec<String>>,
    /// Normalized asset names to leave out.
    pub excluded: HashSet<String>,
    pub commands: CommandTable,
}

impl ArchiveProfile {
    /// A profile that walks the archive's own listfile and copies everything.
    pub fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            output_name: default_output_name(source_name),
            ..Self::default()
        }
    }

    /// The default profile for an archive path, before any config is applied.
    pub fn for_archive(path: &Path) -> Self {
        let source_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if is_save_extension(&extension) {
            Self {
                output_name: format!("{}_{}", source_name, extension),
                is_save: true,
                ..Self::new(&source_name)
            }
        } else {
            Self::new(&source_name)
        }
    }

    /// Directory the archive's outputs are written to.
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.output_name)
    }
}

/// Whether an extension (without the dot, any case) marks a save archive.
pub fn is_save_extension(extension: &str) -> bool {
    extension.eq_ignore_ascii_case("sv") || extension.eq_ignore_ascii_case("hsv")
}

/// Output directory name for a source name when the config sets none.
pub fn default_output_name(source_name: &str) -> String {
    if HELLFIRE_PARTS.contains(&source_name) {
        "hellfire".to_string()
    } else {
        source_name.to_string()
    }
}
