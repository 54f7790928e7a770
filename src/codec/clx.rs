//! CLX lists, sheets and sprites.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use super::{invalid, read_u16, read_u32, CodecError};

/// Size of the header at the start of every sprite.
pub const SPRITE_HEADER_SIZE: usize = 10;

const MAX_TRANSPARENT_RUN: usize = 0x7F;
const FILL_END: usize = 0xBF;
const MAX_FILL_RUN: usize = FILL_END - 0x80;
const MAX_LITERAL_RUN: usize = 0x100 - FILL_END;
const MIN_FILL_RUN: usize = 3;

/// Size of a sheet header referencing `num_lists` lists.
pub fn sheet_header_size(num_lists: usize) -> usize {
    4 * num_lists
}

/// Write the offset of list `index` into a sheet header.
///
/// `sheet` must hold at least `sheet_header_size(index + 1)` bytes.
pub fn set_sheet_list_offset(sheet: &mut [u8], index: usize, offset: usize) {
    LittleEndian::write_u32(&mut sheet[4 * index..4 * index + 4], offset as u32);
}

/// Read the offset of list `index` from a sheet header.
pub fn sheet_list_offset(sheet: &[u8], index: usize) -> Result<usize, CodecError> {
    read_u32(sheet, 4 * index, "sheet header")
}

/// Whether `data` starts with a list header rather than a sheet header.
///
/// A list's last offset is the end of its data.
pub fn is_list(data: &[u8]) -> bool {
    match read_u32(data, 0, "") {
        Ok(count) => read_u32(data, 4 + 4 * count, "").is_ok_and(|end| end == data.len()),
        Err(_) => false,
    }
}

/// Byte ranges of the sprites of a list.
pub fn list_sprite_ranges(list: &[u8]) -> Result<Vec<Range<usize>>, CodecError> {
    let count = read_u32(list, 0, "sprite count")?;
    if 4 * (count + 2) > list.len() {
        return Err(invalid(format!("list header for {} sprites exceeds the data", count)));
    }
    let offsets = (0..=count)
        .map(|i| read_u32(list, 4 + 4 * i, "sprite offsets"))
        .collect::<Result<Vec<_>, _>>()?;
    offsets
        .windows(2)
        .map(|w| {
            if w[0] > w[1] || w[1] > list.len() {
                Err(invalid(format!("sprite offsets {}..{} out of bounds", w[0], w[1])))
            } else {
                Ok(w[0]..w[1])
            }
        })
        .collect()
}

/// Byte ranges of the lists of a sheet.
pub fn sheet_list_ranges(sheet: &[u8]) -> Result<Vec<Range<usize>>, CodecError> {
    let first = sheet_list_offset(sheet, 0)?;
    if first == 0 || first % 4 != 0 || first > sheet.len() {
        return Err(invalid(format!("invalid sheet header offset {}", first)));
    }
    let mut offsets = (0..first / 4)
        .map(|i| sheet_list_offset(sheet, i))
        .collect::<Result<Vec<_>, _>>()?;
    offsets.push(sheet.len());
    offsets
        .windows(2)
        .map(|w| {
            if w[0] > w[1] {
                Err(invalid(format!("list offsets {}..{} out of order", w[0], w[1])))
            } else {
                Ok(w[0]..w[1])
            }
        })
        .collect()
}

/// Width of a sprite.
pub fn sprite_width(sprite: &[u8]) -> Result<u16, CodecError> {
    read_u16(sprite, 2, "sprite width")
}

/// Height of a sprite.
pub fn sprite_height(sprite: &[u8]) -> Result<u16, CodecError> {
    read_u16(sprite, 4, "sprite height")
}

/// Assemble sprites into a list.
pub fn write_list(sprites: &[Vec<u8>]) -> Vec<u8> {
    let header_size = 4 * (sprites.len() + 2);
    let total = header_size + sprites.iter().map(Vec::len).sum::<usize>();
    let mut out = vec![0u8; header_size];
    out.reserve(total - header_size);

    LittleEndian::write_u32(&mut out[0..4], sprites.len() as u32);
    let mut offset = header_size;
    for (i, sprite) in sprites.iter().enumerate() {
        LittleEndian::write_u32(&mut out[4 + 4 * i..8 + 4 * i], offset as u32);
        offset += sprite.len();
    }
    let end = 4 + 4 * sprites.len();
    LittleEndian::write_u32(&mut out[end..end + 4], offset as u32);

    for sprite in sprites {
        out.extend_from_slice(sprite);
    }
    out
}

/// Assemble lists into a sheet.
pub fn write_sheet(lists: &[Vec<u8>]) -> Vec<u8> {
    let header_size = sheet_header_size(lists.len());
    let mut out = vec![0u8; header_size];
    let mut offset = header_size;
    for (i, list) in lists.iter().enumerate() {
        set_sheet_list_offset(&mut out, i, offset);
        offset += list.len();
    }
    for list in lists {
        out.extend_from_slice(list);
    }
    out
}

/// Accumulates pixel commands for one sprite.
struct SpriteEncoder<'a> {
    out: &'a mut Vec<u8>,
    transparent_run: usize,
}

impl SpriteEncoder<'_> {
    fn transparent(&mut self, count: usize) {
        self.transparent_run += count;
    }

    fn flush_transparent(&mut self) {
        while self.transparent_run > 0 {
            let n = self.transparent_run.min(MAX_TRANSPARENT_RUN);
            self.out.push(n as u8);
            self.transparent_run -= n;
        }
    }

    fn opaque(&mut self, pixels: &[u8]) {
        self.flush_transparent();
        let mut literal_start = 0;
        let mut i = 0;
        while i < pixels.len() {
            let run = pixels[i..]
                .iter()
                .take(MAX_FILL_RUN)
                .take_while(|&&p| p == pixels[i])
                .count();
            if run >= MIN_FILL_RUN {
                self.literal(&pixels[literal_start..i]);
                self.out.push((FILL_END - run) as u8);
                self.out.push(pixels[i]);
                literal_start = i + run;
            }
            i += run;
        }
        self.literal(&pixels[literal_start..]);
    }

    fn literal(&mut self, pixels: &[u8]) {
        for chunk in pixels.chunks(MAX_LITERAL_RUN) {
            self.out.push((0x100 - chunk.len()) as u8);
            self.out.extend_from_slice(chunk);
        }
    }
}

/// Encode one sprite. `pixel(x, y)` returns `None` for transparent pixels.
pub fn encode_sprite(
    width: usize,
    height: usize,
    pixel: impl Fn(usize, usize) -> Option<u8>,
) -> Result<Vec<u8>, CodecError> {
    let w = u16::try_from(width).map_err(|_| invalid(format!("sprite width {} too large", width)))?;
    let h = u16::try_from(height).map_err(|_| invalid(format!("sprite height {} too large", height)))?;

    let mut out = vec![0u8; SPRITE_HEADER_SIZE];
    LittleEndian::write_u16(&mut out[0..2], SPRITE_HEADER_SIZE as u16);
    LittleEndian::write_u16(&mut out[2..4], w);
    LittleEndian::write_u16(&mut out[4..6], h);

    let mut encoder = SpriteEncoder {
        out: &mut out,
        transparent_run: 0,
    };
    let mut run = Vec::with_capacity(width);
    for y in (0..height).rev() {
        let mut x = 0;
        while x < width {
            if pixel(x, y).is_none() {
                let start = x;
                while x < width && pixel(x, y).is_none() {
                    x += 1;
                }
                encoder.transparent(x - start);
            } else {
                run.clear();
                while let Some(p) = (x < width).then(|| pixel(x, y)).flatten() {
                    run.push(p);
                    x += 1;
                }
                encoder.opaque(&run);
            }
        }
    }
    encoder.flush_transparent();
    Ok(out)
}

/// Encode `num_frames` equally sized frames stacked vertically in `pixels`.
///
/// `pitch` is the row stride; pixels equal to `transparent` are left out.
pub fn encode_frames(
    pixels: &[u8],
    pitch: usize,
    width: usize,
    frame_height: usize,
    num_frames: usize,
    transparent: Option<u8>,
) -> Result<Vec<u8>, CodecError> {
    if width > pitch {
        return Err(invalid(format!("width {} exceeds pitch {}", width, pitch)));
    }
    let frame_size = pitch * frame_height;
    if pixels.len() < frame_size * num_frames {
        return Err(invalid(format!(
            "{} pixels cannot hold {} frames of {}x{}",
            pixels.len(),
            num_frames,
            pitch,
            frame_height
        )));
    }

    let sprites = (0..num_frames)
        .map(|frame| {
            let base = frame * frame_size;
            encode_sprite(width, frame_height, |x, y| {
                let p = pixels[base + y * pitch + x];
                if Some(p) == transparent {
                    None
                } else {
                    Some(p)
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(write_list(&sprites))
}

/// Walk the pixel commands of `data`, calling `emit(pos, run)` for every run.
///
/// `run` is `None` for transparent runs. Returns the total pixel count.
pub(crate) fn walk_commands(
    data: &[u8],
    mut emit: impl FnMut(usize, Run<'_>) -> Result<(), CodecError>,
) -> Result<usize, CodecError> {
    let mut pos = 0;
    let mut i = 0;
    while i < data.len() {
        let control = data[i] as usize;
        i += 1;
        if control <= MAX_TRANSPARENT_RUN {
            emit(pos, Run::Transparent(control))?;
            pos += control;
        } else if control < FILL_END {
            let n = FILL_END - control;
            let color = *data.get(i).ok_or(CodecError::Truncated("fill colour"))?;
            i += 1;
            emit(pos, Run::Fill(n, color))?;
            pos += n;
        } else {
            let n = 0x100 - control;
            let literal = data.get(i..i + n).ok_or(CodecError::Truncated("pixels"))?;
            i += n;
            emit(pos, Run::Literal(literal))?;
            pos += n;
        }
    }
    Ok(pos)
}

/// One decoded pixel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Run<'a> {
    Transparent(usize),
    Fill(usize, u8),
    Literal(&'a [u8]),
}

/// Decode one sprite into `dst`, a buffer with row stride `pitch`.
fn decode_sprite_into(sprite: &[u8], dst: &mut [u8], pitch: usize) -> Result<(), CodecError> {
    let header_size = read_u16(sprite, 0, "sprite header")? as usize;
    let width = sprite_width(sprite)? as usize;
    let height = sprite_height(sprite)? as usize;
    let data = sprite
        .get(header_size..)
        .ok_or(CodecError::Truncated("sprite header"))?;
    let total = width * height;

    let mut put = |pos: usize, color: u8| {
        let y = height - 1 - pos / width;
        dst[y * pitch + pos % width] = color;
    };
    walk_commands(data, |pos, run| {
        let len = match run {
            Run::Transparent(n) | Run::Fill(n, _) => n,
            Run::Literal(pixels) => pixels.len(),
        };
        if pos + len > total {
            return Err(invalid(format!(
                "pixel data overflows a {}x{} sprite",
                width, height
            )));
        }
        match run {
            Run::Transparent(_) => {}
            Run::Fill(n, color) => (pos..pos + n).for_each(|p| put(p, color)),
            Run::Literal(pixels) => {
                for (k, &color) in pixels.iter().enumerate() {
                    put(pos + k, color);
                }
            }
        }
        Ok(())
    })?;
    Ok(())
}

/// A decoded list: every frame stacked vertically in one pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedList {
    pub pixels: Vec<u8>,
    /// Row stride, the width of the widest frame.
    pub pitch: usize,
    /// `(width, height)` of every frame.
    pub frames: Vec<(usize, usize)>,
}

impl DecodedList {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_width(&self, index: usize) -> usize {
        self.frames[index].0
    }

    pub fn frame_height(&self, index: usize) -> usize {
        self.frames[index].1
    }

    /// Offset of the first pixel of frame `index`.
    pub fn frame_offset(&self, index: usize) -> usize {
        self.frames[..index].iter().map(|(_, h)| h).sum::<usize>() * self.pitch
    }
}

/// Decode a list into a pixel buffer filled with `transparent` where no
/// pixel is drawn.
pub fn decode_list(list: &[u8], transparent: u8) -> Result<DecodedList, CodecError> {
    let ranges = list_sprite_ranges(list)?;
    let frames = ranges
        .iter()
        .map(|r| {
            let sprite = &list[r.clone()];
            Ok((sprite_width(sprite)? as usize, sprite_height(sprite)? as usize))
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    let pitch = frames.iter().map(|(w, _)| *w).max().unwrap_or(0);
    let total_height: usize = frames.iter().map(|(_, h)| *h).sum();
    let mut decoded = DecodedList {
        pixels: vec![transparent; pitch * total_height],
        pitch,
        frames,
    };

    for (index, range) in ranges.into_iter().enumerate() {
        let offset = decoded.frame_offset(index);
        let end = offset + decoded.frame_height(index) * pitch;
        decode_sprite_into(&list[range], &mut decoded.pixels[offset..end], pitch)?;
    }
    Ok(decoded)
}
