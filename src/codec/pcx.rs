//! PCX to CLX conversion.
//!
//! Only 8-bit single-plane RLE PCX images are supported; that is the only
//! kind the game data contains. Multi-frame images stack their frames
//! vertically.

use super::clx::encode_frames;
use super::{invalid, read_u16, CodecError};

/// Size of an exported palette: 256 RGB triplets.
pub const PALETTE_SIZE: usize = 256 * 3;

const HEADER_SIZE: usize = 128;
const PALETTE_MARKER: u8 = 0x0C;
const RLE_MASK: u8 = 0xC0;

/// Result of a PCX conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcxConversion {
    pub clx: Vec<u8>,
    /// The image palette, present when export was requested.
    pub palette: Option<Vec<u8>>,
}

/// A decoded 8-bit PCX image.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PcxImage {
    width: usize,
    height: usize,
    /// Row stride of `pixels`.
    pitch: usize,
    pixels: Vec<u8>,
    palette: Option<Vec<u8>>,
}

/// Convert a PCX image into a CLX list of `num_frames` frames.
pub fn pcx_to_clx(
    data: &[u8],
    num_frames: usize,
    transparent_color: Option<u8>,
    export_palette: bool,
) -> Result<PcxConversion, CodecError> {
    let image = decode(data)?;
    if num_frames == 0 {
        return Err(invalid("number of sprites must be at least 1"));
    }
    if image.height % num_frames != 0 {
        return Err(invalid(format!(
            "image height {} is not divisible into {} frames",
            image.height, num_frames
        )));
    }

    let clx = encode_frames(
        &image.pixels,
        image.pitch,
        image.width,
        image.height / num_frames,
        num_frames,
        transparent_color,
    )?;

    let palette = if export_palette {
        Some(image.palette.ok_or_else(|| invalid("image has no 256-colour palette"))?)
    } else {
        None
    };
    Ok(PcxConversion { clx, palette })
}

fn decode(data: &[u8]) -> Result<PcxImage, CodecError> {
    if data.len() < HEADER_SIZE {
        return Err(CodecError::Truncated("PCX header"));
    }
    if data[0] != 0x0A || data[2] != 1 {
        return Err(invalid("not an RLE-encoded PCX image"));
    }
    if data[3] != 8 || data[65] != 1 {
        return Err(invalid(format!(
            "unsupported PCX layout: {} bits per pixel, {} planes",
            data[3], data[65]
        )));
    }

    let x_min = read_u16(data, 4, "PCX header")? as usize;
    let y_min = read_u16(data, 6, "PCX header")? as usize;
    let x_max = read_u16(data, 8, "PCX header")? as usize;
    let y_max = read_u16(data, 10, "PCX header")? as usize;
    let pitch = read_u16(data, 66, "PCX header")? as usize;
    if x_max < x_min || y_max < y_min {
        return Err(invalid("invalid PCX image bounds"));
    }
    let width = x_max - x_min + 1;
    let height = y_max - y_min + 1;
    if pitch < width {
        return Err(invalid(format!("PCX bytes per line {} below width {}", pitch, width)));
    }

    let size = pitch * height;
    let mut pixels = Vec::with_capacity(size);
    let mut i = HEADER_SIZE;
    while pixels.len() < size {
        let byte = *data.get(i).ok_or(CodecError::Truncated("PCX pixels"))?;
        i += 1;
        if byte & RLE_MASK == RLE_MASK {
            let count = (byte & !RLE_MASK) as usize;
            let value = *data.get(i).ok_or(CodecError::Truncated("PCX pixels"))?;
            i += 1;
            pixels.resize(pixels.len() + count, value);
        } else {
            pixels.push(byte);
        }
    }
    pixels.truncate(size);

    let palette = data
        .len()
        .checked_sub(PALETTE_SIZE + 1)
        .filter(|&start| start >= HEADER_SIZE && data[start] == PALETTE_MARKER)
        .map(|start| data[start + 1..].to_vec());

    Ok(PcxImage {
        width,
        height,
        pitch,
        pixels,
        palette,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::clx::decode_list;

    /// Encode an 8-bit PCX with one byte of padding per line.
    fn pcx(width: usize, height: usize, pixels: &[u8], palette: Option<&[u8]>) -> Vec<u8> {
        let pitch = width + 1;
        let mut data = vec![0u8; HEADER_SIZE];
        data[0] = 0x0A;
        data[1] = 5;
        data[2] = 1;
        data[3] = 8;
        data[8..10].copy_from_slice(&((width - 1) as u16).to_le_bytes());
        data[10..12].copy_from_slice(&((height - 1) as u16).to_le_bytes());
        data[65] = 1;
        data[66..68].copy_from_slice(&(pitch as u16).to_le_bytes());
        for row in pixels.chunks(width) {
            for &p in row.iter().chain(std::iter::once(&0)) {
                if p & RLE_MASK == RLE_MASK {
                    data.extend_from_slice(&[RLE_MASK | 1, p]);
                } else {
                    data.push(p);
                }
            }
        }
        if let Some(palette) = palette {
            data.push(PALETTE_MARKER);
            data.extend_from_slice(palette);
        }
        data
    }

    #[test]
    fn test_two_frames_with_transparency() {
        let pixels = [1, 2, 1, 1, 200, 1, 3, 3, 3, 1, 1, 250];
        let data = pcx(3, 4, &pixels, None);

        let result = pcx_to_clx(&data, 2, Some(1), false).unwrap();
        assert_eq!(result.palette, None);

        let decoded = decode_list(&result.clx, 1).unwrap();
        assert_eq!(decoded.frames, vec![(3, 2), (3, 2)]);
        assert_eq!(decoded.pixels, pixels);
    }

    #[test]
    fn test_run_length_bytes() {
        let mut data = pcx(4, 1, &[0, 0, 0, 0], None);
        data.truncate(HEADER_SIZE);
        data.extend_from_slice(&[RLE_MASK | 5, 9]);

        let result = pcx_to_clx(&data, 1, None, false).unwrap();
        let decoded = decode_list(&result.clx, 0).unwrap();
        assert_eq!(decoded.pixels, vec![9, 9, 9, 9]);
    }

    #[test]
    fn test_palette_export() {
        let palette: Vec<u8> = (0..PALETTE_SIZE).map(|i| (i % 256) as u8).collect();
        let data = pcx(2, 1, &[4, 5], Some(&palette));

        let result = pcx_to_clx(&data, 1, None, true).unwrap();
        assert_eq!(result.palette.as_deref(), Some(&palette[..]));
    }

    #[test]
    fn test_palette_export_without_palette() {
        let data = pcx(2, 1, &[4, 5], None);
        assert!(pcx_to_clx(&data, 1, None, true).is_err());
    }

    #[test]
    fn test_indivisible_frames() {
        let data = pcx(2, 3, &[0; 6], None);
        assert!(pcx_to_clx(&data, 2, None, false).is_err());
    }

    #[test]
    fn test_zero_frames() {
        let data = pcx(2, 2, &[0; 4], None);
        let err = pcx_to_clx(&data, 0, None, false).unwrap_err();
        assert!(err.to_string().contains("at least 1"), "{err}");
    }

    #[test]
    fn test_rejects_non_pcx() {
        assert!(pcx_to_clx(&[0u8; 200], 1, None, false).is_err());
        assert!(pcx_to_clx(&[0x0A; 20], 1, None, false).is_err());
    }
}
