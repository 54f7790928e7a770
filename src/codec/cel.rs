//! CEL to CLX conversion.
//!
//! CEL frames store rows bottom-up as signed control bytes: a positive
//! value copies that many literal pixels, a negative value skips that many
//! transparent pixels. Some frames begin with a 10-byte header of row-chunk
//! offsets.

use byteorder::{ByteOrder, LittleEndian};

use super::clx::{encode_sprite, is_list, list_sprite_ranges, sheet_list_ranges, write_list, write_sheet};
use super::{frame_width, invalid, CodecError};

const FRAME_HEADER_SIZE: usize = 10;

/// Convert a CEL list, or a sheet of lists, to a CLX buffer.
pub fn cel_to_clx(data: &[u8], widths: &[u16]) -> Result<Vec<u8>, CodecError> {
    if widths.is_empty() {
        return Err(invalid("no frame widths given"));
    }
    if is_list(data) {
        return convert_list(data, widths);
    }
    let lists = sheet_list_ranges(data)?
        .into_iter()
        .map(|range| convert_list(&data[range], widths))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(write_sheet(&lists))
}

fn convert_list(list: &[u8], widths: &[u16]) -> Result<Vec<u8>, CodecError> {
    let sprites = list_sprite_ranges(list)?
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            let width = frame_width(widths, index)? as usize;
            convert_frame(&list[range], width)
                .map_err(|e| invalid(format!("frame {}: {}", index, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(write_list(&sprites))
}

fn convert_frame(frame: &[u8], width: usize) -> Result<Vec<u8>, CodecError> {
    if width == 0 {
        return Err(invalid("frame width is 0"));
    }
    let data = if has_frame_header(frame) {
        &frame[FRAME_HEADER_SIZE..]
    } else {
        frame
    };

    // Pixels in storage order: bottom row first.
    let mut stream: Vec<Option<u8>> = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let control = data[i] as i8;
        i += 1;
        if control < 0 {
            let count = control.unsigned_abs() as usize;
            stream.resize(stream.len() + count, None);
        } else {
            let count = control as usize;
            let pixels = data
                .get(i..i + count)
                .ok_or(CodecError::Truncated("pixels"))?;
            stream.extend(pixels.iter().copied().map(Some));
            i += count;
        }
    }

    let height = stream.len().div_ceil(width);
    stream.resize(width * height, None);
    encode_sprite(width, height, |x, y| stream[(height - 1 - y) * width + x])
}

fn has_frame_header(frame: &[u8]) -> bool {
    frame.len() >= FRAME_HEADER_SIZE && LittleEndian::read_u16(frame) as usize == FRAME_HEADER_SIZE
}
