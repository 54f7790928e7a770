//! mpq-minify - legacy sprite conversion for Diablo and Hellfire archives
//!
//! A library for walking unpacked MPQ archives, converting their CEL, CL2
//! and PCX graphics to CLX sprite sheets and splitting spell icon sheets
//! into background and foreground layers.

pub mod archive;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod types;

pub use archive::{Archive, DirArchive, MemoryArchive};
pub use config::{ArchiveProfile, Config};
pub use error::{MinifyError, Result};
pub use parser::{parse_directive, parse_directives, Directive};
pub use pipeline::{process_archive, ConversionSummary};
pub use registry::{CommandTable, CommandTableBuilder, Resolution};
pub use types::{CommandKind, ConversionCommand};
