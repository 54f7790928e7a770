//! In-memory archive.

use std::collections::HashMap;

use crate::error::{MinifyError, Result};

use super::{member_key, Archive, FileHandle};

/// An archive whose members live in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryArchive {
    files: Vec<Vec<u8>>,
    index: HashMap<String, u32>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    pub fn insert(&mut self, path: &str, data: Vec<u8>) -> &mut Self {
        let key = member_key(path);
        match self.index.get(&key) {
            Some(&i) => self.files[i as usize] = data,
            None => {
                self.index.insert(key, self.files.len() as u32);
                self.files.push(data);
            }
        }
        self
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn get(&self, file: FileHandle, path: &str) -> Result<&[u8]> {
        self.files
            .get(file.0 as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| MinifyError::archive(path, "invalid file handle"))
    }
}

impl Archive for MemoryArchive {
    fn find_file(&mut self, path: &str) -> Result<Option<FileHandle>> {
        Ok(self.index.get(&member_key(path)).copied().map(FileHandle))
    }

    fn file_size(&mut self, file: FileHandle, path: &str) -> Result<usize> {
        Ok(self.get(file, path)?.len())
    }

    fn read_file_into(
        &mut self,
        file: FileHandle,
        path: &str,
        dst: &mut [u8],
        _decrypt: bool,
    ) -> Result<()> {
        let data = self.get(file, path)?;
        if data.len() != dst.len() {
            return Err(MinifyError::archive(
                path,
                format!("expected {} bytes, member has {}", dst.len(), data.len()),
            ));
        }
        dst.copy_from_slice(data);
        Ok(())
    }
}
