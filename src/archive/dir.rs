//! Unpacked archive directories.
//!
//! An archive extracted by an external MPQ tool is a directory tree whose
//! relative paths are the member names; the extractor also writes the
//! `(listfile)` member at the root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{MinifyError, Result};

use super::{member_key, Archive, FileHandle};

/// An archive backed by a directory of extracted members.
#[derive(Debug)]
pub struct DirArchive {
    root: PathBuf,
    files: Vec<PathBuf>,
    index: HashMap<String, u32>,
}

impl DirArchive {
    /// Index every file below `root`.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(MinifyError::Io {
                path: root.to_path_buf(),
                message: "Failed to open archive: expected a directory unpacked from the MPQ by an external extractor"
                    .to_string(),
            });
        }

        let mut files = Vec::new();
        let mut index = HashMap::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| MinifyError::Io {
                path: root.to_path_buf(),
                message: format!("Failed to open archive: {}", e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("\\");
            index.insert(member_key(&name), files.len() as u32);
            files.push(entry.path().to_path_buf());
        }

        Ok(Self {
            root: root.to_path_buf(),
            files,
            index,
        })
    }

    /// Directory this archive was opened from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn member_path(&self, file: FileHandle, path: &str) -> Result<&Path> {
        self.files
            .get(file.0 as usize)
            .map(PathBuf::as_path)
            .ok_or_else(|| MinifyError::archive(path, "invalid file handle"))
    }
}

impl Archive for DirArchive {
    fn find_file(&mut self, path: &str) -> Result<Option<FileHandle>> {
        Ok(self.index.get(&member_key(path)).copied().map(FileHandle))
    }

    fn file_size(&mut self, file: FileHandle, path: &str) -> Result<usize> {
        let member = self.member_path(file, path)?;
        let metadata = fs::metadata(member).map_err(|e| MinifyError::archive(path, e.to_string()))?;
        Ok(metadata.len() as usize)
    }

    fn read_file_into(
        &mut self,
        file: FileHandle,
        path: &str,
        dst: &mut [u8],
        _decrypt: bool,
    ) -> Result<()> {
        let member = self.member_path(file, path)?;
        let data = fs::read(member).map_err(|e| MinifyError::archive(path, e.to_string()))?;
        if data.len() != dst.len() {
            return Err(MinifyError::archive(
                path,
                format!("expected {} bytes, read {}", dst.len(), data.len()),
            ));
        }
        dst.copy_from_slice(&data);
        Ok(())
    }
}
