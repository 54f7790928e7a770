//! Core domain types for the conversion pipeline.
//!
//! - `ConversionCommand` - what to do with one legacy sprite file
//! - asset name helpers shared by the registry, walker and output paths

mod asset;
mod command;

pub use asset::{
    archive_path, file_stem, mirrored_path, normalize_name, split_parent, with_extension,
    with_file_name,
};
pub use command::{CommandKind, ConversionCommand};
