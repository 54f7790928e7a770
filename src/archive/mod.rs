//! Archive access.
//!
//! The pipeline reads archive members through the `Archive` trait. Member
//! paths use backslash separators and are matched case-insensitively, the
//! way MPQ archives address their files.

mod dir;
mod listfile;
mod memory;

use crate::error::{MinifyError, Result};

pub use dir::DirArchive;
pub use listfile::split_listfile;
pub(crate) use listfile::split_lines;
pub use memory::MemoryArchive;

/// Name of the in-archive manifest member.
pub const LISTFILE_NAME: &str = "(listfile)";

/// Stable handle to a member of one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);

/// Read access to the members of an archive.
pub trait Archive {
    /// Look up a member. Returns `Ok(None)` if the archive has no such member.
    fn find_file(&mut self, path: &str) -> Result<Option<FileHandle>>;

    /// Unpacked size of a member in bytes.
    fn file_size(&mut self, file: FileHandle, path: &str) -> Result<usize>;

    /// Read a member into `dst`, which must be exactly `file_size` bytes.
    ///
    /// `decrypt` is false only for the manifest, which archives store
    /// without the name-keyed encryption used for other members.
    fn read_file_into(
        &mut self,
        file: FileHandle,
        path: &str,
        dst: &mut [u8],
        decrypt: bool,
    ) -> Result<()>;

    /// Look up a member that must exist.
    fn file_handle(&mut self, path: &str) -> Result<FileHandle> {
        self.find_file(path)?
            .ok_or_else(|| MinifyError::archive(path, "file not found"))
    }

    /// Read a whole member.
    ///
    /// When `optional` is set a missing member yields `Ok(None)`; otherwise
    /// it is an error.
    fn read_file(&mut self, path: &str, decrypt: bool, optional: bool) -> Result<Option<Vec<u8>>> {
        let file = match self.find_file(path)? {
            Some(file) => file,
            None if optional => return Ok(None),
            None => return Err(MinifyError::archive(path, "file not found")),
        };
        let size = self.file_size(file, path)?;
        let mut buf = vec![0u8; size];
        self.read_file_into(file, path, &mut buf, decrypt)?;
        Ok(Some(buf))
    }

    /// Read and split the archive's own manifest.
    fn listfile(&mut self) -> Result<Vec<String>> {
        let data = self.read_file(LISTFILE_NAME, false, false)?.unwrap_or_default();
        Ok(split_listfile(&data))
    }
}

/// Key used to match member paths: backslash separators, ASCII lower case.
pub(crate) fn member_key(path: &str) -> String {
    path.replace('/', "\\").to_ascii_lowercase()
}
