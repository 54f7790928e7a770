//! CL2 to CLX conversion.
//!
//! CL2 pixel commands are byte-for-byte identical to CLX commands, so the
//! conversion only rewrites each frame header: CL2 stores row-chunk offsets
//! where CLX stores the frame width and height.

use byteorder::{ByteOrder, LittleEndian};

use super::clx::{is_list, list_sprite_ranges, sheet_list_ranges, walk_commands};
use super::{frame_width, invalid, read_u16, CodecError};

/// Sheets nest at most this deep: a combined sheet of direction groups.
const MAX_NESTING: usize = 2;

/// Convert a CL2 list, or a sheet of lists, to CLX in place.
///
/// `widths` gives the frame widths of each list; the last width repeats.
pub fn cl2_to_clx(data: &mut [u8], widths: &[u16]) -> Result<(), CodecError> {
    if widths.is_empty() {
        return Err(invalid("no frame widths given"));
    }
    convert(data, widths, 0)
}

fn convert(data: &mut [u8], widths: &[u16], depth: usize) -> Result<(), CodecError> {
    if is_list(data) {
        return convert_list(data, widths);
    }
    if depth >= MAX_NESTING {
        return Err(invalid("sprite sheets nested too deeply"));
    }
    for range in sheet_list_ranges(data)? {
        convert(&mut data[range], widths, depth + 1)?;
    }
    Ok(())
}

fn convert_list(list: &mut [u8], widths: &[u16]) -> Result<(), CodecError> {
    for (index, range) in list_sprite_ranges(list)?.into_iter().enumerate() {
        let width = frame_width(widths, index)?;
        let frame = &mut list[range];

        let header_size = read_u16(frame, 0, "frame header")? as usize;
        if header_size < 6 || header_size > frame.len() {
            return Err(invalid(format!(
                "frame {} has an invalid header size {}",
                index, header_size
            )));
        }
        let height = frame_height(&frame[header_size..], width)
            .map_err(|e| invalid(format!("frame {}: {}", index, e)))?;

        LittleEndian::write_u16(&mut frame[2..4], width);
        LittleEndian::write_u16(&mut frame[4..6], height);
        frame[6..header_size].fill(0);
    }
    Ok(())
}

/// Height of a frame with the given width, from its pixel commands.
fn frame_height(data: &[u8], width: u16) -> Result<u16, CodecError> {
    if width == 0 {
        return Err(invalid("frame width is 0"));
    }
    let pixels = walk_commands(data, |_, _| Ok(()))?;
    let height = pixels.div_ceil(width as usize);
    u16::try_from(height).map_err(|_| invalid(format!("frame height {} too large", height)))
}
