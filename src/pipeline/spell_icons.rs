//! Spell icon background extraction.
//!
//! Spell icon sheets draw every icon on top of the same stone background.
//! One frame of each sheet shows the background alone; it is split off into
//! its own sheet and subtracted from every other frame, leaving foreground
//! icons on a transparent background.

use thiserror::Error;

use crate::codec::{decode_list, encode_frames, CodecError};

/// Pixel value meaning "no content" in decoded buffers.
pub const TRANSPARENT_COLOR: u8 = 255;

/// Frame of the spell icon sheets that shows only the background.
pub const BACKGROUND_FRAME: usize = 26;

/// Stems of the sheets that receive background extraction.
pub const SPELL_ICON_SHEETS: [&str; 2] = ["spelli2", "spelicon"];

/// Pixels in this range are background colours.
const BACKGROUND_BAND: std::ops::RangeInclusive<u8> = 192..=205;

/// Neighbours in this range count towards removing a background pixel.
const NEIGHBOUR_BAND: std::ops::Range<u8> = 192..199;

/// A pixel is removed when more than this many neighbours qualify.
const NEIGHBOUR_THRESHOLD: usize = 4;

const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Failure to extract spell icons.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Failed CLX->Pixels conversion: {0}")]
    Decode(#[source] CodecError),

    #[error("Failed Pixels->CLX conversion: {0}")]
    Encode(#[source] CodecError),

    #[error("Unsupported icon size {width}x{height}")]
    UnsupportedIconSize { width: usize, height: usize },

    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height} like frame 0")]
    MixedFrameSizes {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("sheet has {frames} frames, background frame {index} is missing")]
    MissingBackgroundFrame { frames: usize, index: usize },
}

/// Thickness of the decorative frame around each icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borders {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

/// Layout of a known spell icon sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconGeometry {
    pub width: usize,
    pub height: usize,
    pub borders: Borders,
    /// Frames at the end of the sheet that are not icons.
    pub unused_trailing_frames: usize,
}

impl IconGeometry {
    /// Look up the layout for an icon size.
    pub fn for_size(width: usize, height: usize) -> Result<Self, ExtractError> {
        let (borders, unused_trailing_frames) = match (width, height) {
            // `spelli2`: the last sprite is unused.
            (37, 38) => (
                Borders {
                    top: 2,
                    right: 2,
                    bottom: 1,
                    left: 1,
                },
                1,
            ),
            // `spelicon`: the last 9 sprites are overlays.
            (56, 56) => (
                Borders {
                    top: 4,
                    right: 4,
                    bottom: 5,
                    left: 5,
                },
                9,
            ),
            _ => return Err(ExtractError::UnsupportedIconSize { width, height }),
        };
        Ok(Self {
            width,
            height,
            borders,
            unused_trailing_frames,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.width * self.height
    }
}

/// Background and foreground pixel layers of a spell icon sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLayers {
    pub geometry: IconGeometry,
    /// The background frame with its border cleared.
    pub background: Vec<u8>,
    /// Every kept frame with the background removed.
    pub foreground: Vec<u8>,
    /// Number of frames in `foreground`.
    pub num_frames: usize,
}

/// Re-encoded spell icon sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellIcons {
    /// Single-frame CLX list with the background.
    pub background: Vec<u8>,
    /// CLX list with the foreground icons.
    pub foreground: Vec<u8>,
}

/// Whether a converted file is a spell icon sheet, by its output stem.
pub fn is_spell_icon_sheet(stem: &str) -> bool {
    SPELL_ICON_SHEETS.iter().any(|s| s.eq_ignore_ascii_case(stem))
}

/// Split a CLX spell icon list into background and foreground sheets.
pub fn extract_spell_icons(clx: &[u8]) -> Result<SpellIcons, ExtractError> {
    let decoded = decode_list(clx, TRANSPARENT_COLOR).map_err(ExtractError::Decode)?;
    if decoded.num_frames() == 0 {
        return Err(ExtractError::MissingBackgroundFrame {
            frames: 0,
            index: BACKGROUND_FRAME,
        });
    }
    let width = decoded.frame_width(0);
    let height = decoded.frame_height(0);
    if let Some((index, &(w, h))) = decoded
        .frames
        .iter()
        .enumerate()
        .find(|&(_, &size)| size != (width, height))
    {
        return Err(ExtractError::MixedFrameSizes {
            index,
            width: w,
            height: h,
            expected_width: width,
            expected_height: height,
        });
    }

    let layers = separate_layers(
        decoded.pixels,
        width,
        height,
        decoded.frames.len(),
        BACKGROUND_FRAME,
    )?;
    encode_layers(&layers)
}

/// Encode both layers as CLX lists.
pub fn encode_layers(layers: &IconLayers) -> Result<SpellIcons, ExtractError> {
    let IconGeometry { width, height, .. } = layers.geometry;
    let background = encode_frames(&layers.background, width, width, height, 1, Some(TRANSPARENT_COLOR))
        .map_err(ExtractError::Encode)?;
    let foreground = encode_frames(
        &layers.foreground,
        width,
        width,
        height,
        layers.num_frames,
        Some(TRANSPARENT_COLOR),
    )
    .map_err(ExtractError::Encode)?;
    Ok(SpellIcons {
        background,
        foreground,
    })
}

/// Separate the background of a decoded icon sheet from its icons.
///
/// `pixels` holds `num_frames` frames of `width` x `height`, stacked.
/// `background_frame` is the index of the frame showing only background.
pub fn separate_layers(
    mut pixels: Vec<u8>,
    width: usize,
    height: usize,
    num_frames: usize,
    background_frame: usize,
) -> Result<IconLayers, ExtractError> {
    let geometry = IconGeometry::for_size(width, height)?;
    let frame_size = geometry.frame_size();
    if background_frame >= num_frames || pixels.len() < num_frames * frame_size {
        return Err(ExtractError::MissingBackgroundFrame {
            frames: num_frames,
            index: background_frame,
        });
    }
    let kept_frames = num_frames.saturating_sub(geometry.unused_trailing_frames);

    let bg_range = background_frame * frame_size..(background_frame + 1) * frame_size;
    let bg = pixels[bg_range.clone()].to_vec();

    let mut background = bg.clone();
    clear_borders(&mut background, width, height, &geometry.borders);

    for frame in 0..kept_frames {
        if frame == background_frame {
            continue;
        }
        let start = frame * frame_size;
        remove_background(&mut pixels[start..start + frame_size], width, height, &geometry.borders, &bg);
    }
    pixels[bg_range].fill(TRANSPARENT_COLOR);
    pixels.truncate(kept_frames * frame_size);

    Ok(IconLayers {
        geometry,
        background,
        foreground: pixels,
        num_frames: kept_frames,
    })
}

/// Set every pixel of the border area to transparent.
pub fn clear_borders(pixels: &mut [u8], width: usize, height: usize, borders: &Borders) {
    let inner_bottom = height.saturating_sub(borders.bottom);
    for (y, row) in pixels.chunks_mut(width).take(height).enumerate() {
        if y < borders.top || y >= inner_bottom {
            row.fill(TRANSPARENT_COLOR);
            continue;
        }
        let left = borders.left.min(width);
        let right = width.saturating_sub(borders.right).max(left);
        row[..left].fill(TRANSPARENT_COLOR);
        row[right..].fill(TRANSPARENT_COLOR);
    }
}

/// Remove the background from one icon frame.
///
/// Borders are cleared, interior pixels equal to the co-located background
/// pixel are cleared, then remaining background-coloured pixels mostly
/// surrounded by cleared or background-coloured neighbours are cleared too.
/// The backgrounds of different icons are not identical (they carry
/// per-pixel noise), so the exact diff alone leaves speckles behind.
pub fn remove_background(pixels: &mut [u8], width: usize, height: usize, borders: &Borders, bg: &[u8]) {
    clear_borders(pixels, width, height, borders);

    let xs = borders.left..width.saturating_sub(borders.right);
    let ys = borders.top..height.saturating_sub(borders.bottom);

    for y in ys.clone() {
        for x in xs.clone() {
            let i = y * width + x;
            if pixels[i] == bg[i] {
                pixels[i] = TRANSPARENT_COLOR;
            }
        }
    }

    for y in ys {
        for x in xs.clone() {
            let i = y * width + x;
            let pixel = pixels[i];
            if pixel == TRANSPARENT_COLOR || !BACKGROUND_BAND.contains(&pixel) {
                continue;
            }
            let qualifying = NEIGHBOURS
                .iter()
                .filter_map(|&(dx, dy)| {
                    let nx = x.checked_add_signed(dx).filter(|&nx| nx < width)?;
                    let ny = y.checked_add_signed(dy).filter(|&ny| ny < height)?;
                    Some(pixels[ny * width + nx])
                })
                .filter(|&c| c == TRANSPARENT_COLOR || NEIGHBOUR_BAND.contains(&c))
                .count();
            if qualifying > NEIGHBOUR_THRESHOLD {
                pixels[i] = TRANSPARENT_COLOR;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::clx::{list_sprite_ranges, write_list};

    const W: usize = 37;
    const H: usize = 38;

    fn small_borders() -> Borders {
        IconGeometry::for_size(W, H).unwrap().borders
    }

    fn is_border(x: usize, y: usize, b: &Borders) -> bool {
        y < b.top || y >= H - b.bottom || x < b.left || x >= W - b.right
    }

    #[test]
    fn test_known_geometries() {
        let small = IconGeometry::for_size(37, 38).unwrap();
        assert_eq!(
            small.borders,
            Borders {
                top: 2,
                right: 2,
                bottom: 1,
                left: 1
            }
        );
        assert_eq!(small.unused_trailing_frames, 1);

        let large = IconGeometry::for_size(56, 56).unwrap();
        assert_eq!(
            large.borders,
            Borders {
                top: 4,
                right: 4,
                bottom: 5,
                left: 5
            }
        );
        assert_eq!(large.unused_trailing_frames, 9);
    }

    #[test]
    fn test_unsupported_geometry() {
        assert_eq!(
            IconGeometry::for_size(38, 37),
            Err(ExtractError::UnsupportedIconSize { width: 38, height: 37 })
        );
        assert_eq!(
            ExtractError::UnsupportedIconSize { width: 32, height: 32 }.to_string(),
            "Unsupported icon size 32x32"
        );
    }

    #[test]
    fn test_identical_frame_becomes_transparent() {
        let bg: Vec<u8> = (0..W * H).map(|i| (i % 180) as u8).collect();
        let mut frame = bg.clone();
        remove_background(&mut frame, W, H, &small_borders(), &bg);
        assert!(frame.iter().all(|&p| p == TRANSPARENT_COLOR));
    }

    #[test]
    fn test_removal_is_idempotent() {
        let bg = vec![200u8; W * H];
        let mut frame: Vec<u8> = (0..W * H).map(|i| (i * 7 % 180) as u8).collect();
        remove_background(&mut frame, W, H, &small_borders(), &bg);
        let once = frame.clone();
        remove_background(&mut frame, W, H, &small_borders(), &bg);
        assert_eq!(frame, once);

        let mut blank = vec![TRANSPARENT_COLOR; W * H];
        remove_background(&mut blank, W, H, &small_borders(), &bg);
        assert!(blank.iter().all(|&p| p == TRANSPARENT_COLOR));
    }

    #[test]
    fn test_noisy_background_pixel_removed_by_vote() {
        let borders = small_borders();
        let bg = vec![195u8; W * H];
        let mut frame = bg.clone();
        // Noise: differs from the reference but stays in the background band.
        frame[10 * W + 10] = 201;
        remove_background(&mut frame, W, H, &borders, &bg);
        assert_eq!(frame[10 * W + 10], TRANSPARENT_COLOR);
    }

    #[test]
    fn test_foreground_survives() {
        let borders = small_borders();
        let bg = vec![195u8; W * H];
        let mut frame = bg.clone();
        // A 3x3 foreground block in the background band: the centre pixel
        // has no qualifying neighbours and is kept.
        for y in 9..12 {
            for x in 9..12 {
                frame[y * W + x] = 204;
            }
        }
        frame[20 * W + 20] = 40;
        remove_background(&mut frame, W, H, &borders, &bg);
        assert_eq!(frame[10 * W + 10], 204);
        assert_eq!(frame[20 * W + 20], 40);
    }

    #[test]
    fn test_borders_cleared() {
        let borders = small_borders();
        let bg = vec![0u8; W * H];
        let mut frame = vec![50u8; W * H];
        remove_background(&mut frame, W, H, &borders, &bg);
        for y in 0..H {
            for x in 0..W {
                let expected = if is_border(x, y, &borders) { TRANSPARENT_COLOR } else { 50 };
                assert_eq!(frame[y * W + x], expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_two_frame_sheet_exact_match() {
        let pixels = vec![200u8; 2 * W * H];
        let layers = separate_layers(pixels, W, H, 2, 1).unwrap();

        assert_eq!(layers.num_frames, 1);
        assert_eq!(layers.foreground.len(), W * H);
        assert!(layers.foreground.iter().all(|&p| p == TRANSPARENT_COLOR));
    }

    #[test]
    fn test_two_frame_sheet_single_pixel_survives() {
        let mut pixels = vec![200u8; 2 * W * H];
        pixels[15 * W + 18] = 150;
        let layers = separate_layers(pixels, W, H, 2, 1).unwrap();

        for (i, &p) in layers.foreground.iter().enumerate() {
            let expected = if i == 15 * W + 18 { 150 } else { TRANSPARENT_COLOR };
            assert_eq!(p, expected, "pixel {i}");
        }
    }

    #[test]
    fn test_background_layer_keeps_interior() {
        let mut pixels = vec![200u8; 2 * W * H];
        pixels[W * H + 5 * W + 5] = 17;
        let layers = separate_layers(pixels, W, H, 2, 1).unwrap();

        let borders = small_borders();
        assert_eq!(layers.background[5 * W + 5], 17);
        assert_eq!(layers.background[0], TRANSPARENT_COLOR);
        assert_eq!(layers.background[(H - 1) * W + 3], TRANSPARENT_COLOR);
        assert_eq!(layers.background[10 * W + W - borders.right], TRANSPARENT_COLOR);
        assert_eq!(layers.background[10 * W + 10], 200);
    }

    #[test]
    fn test_background_frame_blanked_and_trailing_dropped() {
        let frames = 30;
        let mut pixels = vec![100u8; frames * W * H];
        for p in &mut pixels[BACKGROUND_FRAME * W * H..(BACKGROUND_FRAME + 1) * W * H] {
            *p = 199;
        }
        let layers = separate_layers(pixels, W, H, frames, BACKGROUND_FRAME).unwrap();

        assert_eq!(layers.num_frames, 29);
        let bg_frame = &layers.foreground[BACKGROUND_FRAME * W * H..(BACKGROUND_FRAME + 1) * W * H];
        assert!(bg_frame.iter().all(|&p| p == TRANSPARENT_COLOR));
        assert_eq!(layers.foreground[3 * W + 3], 100);
    }

    #[test]
    fn test_large_sheet_layers() {
        const S: usize = 56;
        let frames = 36;
        let mut pixels = vec![100u8; frames * S * S];
        for p in &mut pixels[BACKGROUND_FRAME * S * S..(BACKGROUND_FRAME + 1) * S * S] {
            *p = 199;
        }
        let layers = separate_layers(pixels, S, S, frames, BACKGROUND_FRAME).unwrap();

        assert_eq!(layers.num_frames, 27);
        assert_eq!(layers.foreground.len(), 27 * S * S);

        // Borders top 4, right 4, bottom 5, left 5.
        let frame = &layers.foreground[..S * S];
        for y in 0..S {
            for x in 0..S {
                let border = y < 4 || y >= S - 5 || x < 5 || x >= S - 4;
                let expected = if border { TRANSPARENT_COLOR } else { 100 };
                assert_eq!(frame[y * S + x], expected, "pixel ({x}, {y})");
            }
        }

        let bg_frame = &layers.foreground[BACKGROUND_FRAME * S * S..];
        assert!(bg_frame.iter().all(|&p| p == TRANSPARENT_COLOR));
        assert_eq!(layers.background[4 * S + 5], 199);
        assert_eq!(layers.background[4 * S + 4], TRANSPARENT_COLOR);
        assert_eq!(layers.background[(S - 5) * S + 10], TRANSPARENT_COLOR);
    }

    #[test]
    fn test_missing_background_frame() {
        let pixels = vec![0u8; 2 * W * H];
        assert_eq!(
            separate_layers(pixels, W, H, 2, BACKGROUND_FRAME),
            Err(ExtractError::MissingBackgroundFrame {
                frames: 2,
                index: BACKGROUND_FRAME
            })
        );
    }

    #[test]
    fn test_extract_from_clx() {
        let frames = BACKGROUND_FRAME + 2;
        let mut pixels = vec![197u8; frames * W * H];
        // One icon pixel on frame 0.
        pixels[12 * W + 12] = 60;
        let clx = encode_frames(&pixels, W, W, H, frames, Some(TRANSPARENT_COLOR)).unwrap();

        let icons = extract_spell_icons(&clx).unwrap();

        let background = decode_list(&icons.background, TRANSPARENT_COLOR).unwrap();
        assert_eq!(background.frames, vec![(W, H)]);
        assert_eq!(background.pixels[12 * W + 12], 197);

        let foreground = decode_list(&icons.foreground, TRANSPARENT_COLOR).unwrap();
        assert_eq!(foreground.num_frames(), frames - 1);
        assert_eq!(foreground.pixels[12 * W + 12], 60);
        assert_eq!(foreground.pixels[12 * W + 13], TRANSPARENT_COLOR);
    }

    #[test]
    fn test_extract_rejects_other_sizes() {
        let pixels = vec![1u8; 32 * 32];
        let clx = encode_frames(&pixels, 32, 32, 32, 1, None).unwrap();
        assert_eq!(
            extract_spell_icons(&clx),
            Err(ExtractError::UnsupportedIconSize { width: 32, height: 32 })
        );
    }

    #[test]
    fn test_extract_rejects_mixed_frame_sizes() {
        let icon = encode_frames(&vec![197u8; W * H], W, W, H, 1, None).unwrap();
        let odd = encode_frames(&vec![197u8; 32 * 32], 32, 32, 32, 1, None).unwrap();
        let sprite = |list: &[u8]| list[list_sprite_ranges(list).unwrap()[0].clone()].to_vec();
        let clx = write_list(&[sprite(&icon), sprite(&icon), sprite(&odd)]);

        assert_eq!(
            extract_spell_icons(&clx),
            Err(ExtractError::MixedFrameSizes {
                index: 2,
                width: 32,
                height: 32,
                expected_width: W,
                expected_height: H,
            })
        );
    }

    #[test]
    fn test_spell_icon_sheet_names() {
        assert!(is_spell_icon_sheet("spelli2"));
        assert!(is_spell_icon_sheet("SpelIcon"));
        assert!(!is_spell_icon_sheet("spelli"));
    }
}
