//! Sprite codecs.
//!
//! Every legacy format is converted to CLX, a run-length sprite format:
//!
//! - a **sprite** is a 10-byte header (header size, width, height, reserved)
//!   followed by pixel commands for the rows from bottom to top
//! - a **list** is `u32` sprite count, `count + 1` `u32` offsets, sprites
//! - a **sheet** is `n` `u32` list offsets followed by `n` lists
//!
//! Pixel commands are single control bytes: `0x00..=0x7F` skips that many
//! transparent pixels, `0x80..=0xBE` fills `0xBF - control` pixels with the
//! next byte, and `0xBF..=0xFF` copies `0x100 - control` literal pixels.

pub mod cel;
pub mod cl2;
pub mod clx;
pub mod pcx;

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

pub use cel::cel_to_clx;
pub use cl2::cl2_to_clx;
pub use clx::{decode_list, encode_frames, sheet_header_size, set_sheet_list_offset, DecodedList};
pub use pcx::{pcx_to_clx, PcxConversion, PALETTE_SIZE};

/// Failure reported by a transcoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of data while reading {0}")]
    Truncated(&'static str),

    #[error("{0}")]
    Invalid(String),
}

pub(crate) fn invalid(message: impl Into<String>) -> CodecError {
    CodecError::Invalid(message.into())
}

pub(crate) fn read_u16(data: &[u8], pos: usize, what: &'static str) -> Result<u16, CodecError> {
    data.get(pos..pos + 2)
        .map(LittleEndian::read_u16)
        .ok_or(CodecError::Truncated(what))
}

pub(crate) fn read_u32(data: &[u8], pos: usize, what: &'static str) -> Result<usize, CodecError> {
    data.get(pos..pos + 4)
        .map(|b| LittleEndian::read_u32(b) as usize)
        .ok_or(CodecError::Truncated(what))
}

/// Width of frame `index`; the last width repeats for later frames.
pub(crate) fn frame_width(widths: &[u16], index: usize) -> Result<u16, CodecError> {
    widths
        .get(index)
        .or_else(|| widths.last())
        .copied()
        .ok_or_else(|| invalid("no frame widths given"))
}
