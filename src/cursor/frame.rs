//! Icon/cursor frame decoding.
//!
//! A frame is a complete `.cur`/`.ico` file holding (at least) one image:
//!
//! ```text
//! offset  size  field
//! 0       2     reserved
//! 2       2     resource type (1 = icon, 2 = cursor)
//! 4       2     image count
//! 6       1     width  (0 = 256)
//! 7       1     height (0 = 256)
//! 10      2     hotspot x (cursor) / color planes (icon)
//! 12      2     hotspot y (cursor) / bits per pixel (icon)
//! 14      4     payload size
//! 18      4     payload offset
//! ```
//!
//! The payload is either a PNG stream or a headered bottom-up bitmap whose
//! height field counts both the color bitmap and the 1-bit AND mask that
//! follows it.

use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;

use super::ByteView;
use crate::error::{FormatError, Result};
use crate::icon::{DecodedFrame, Hotspot};

const CURSOR_RESOURCE: u16 = 2;
const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];
const MIN_BITMAP_HEADER: u32 = 16;
const MAX_DIMENSION: u32 = 1024;

/// Decodes one icon/cursor structure into an image and hotspot.
pub fn decode(blob: &[u8]) -> Result<DecodedFrame> {
    let view = ByteView::new(blob);
    let hotspot = read_hotspot(&view)?;
    let size = view.u32_le(14)? as usize;
    let offset = view.u32_le(18)? as usize;

    if view.slice(offset, PNG_SIGNATURE.len()).ok() == Some(&PNG_SIGNATURE[..]) {
        let png = view.slice(offset, size)?;
        let image = image::load_from_memory_with_format(png, ImageFormat::Png)
            .map_err(|e| FormatError::Png(e.to_string()))?
            .to_rgba8();
        return Ok(checked(DecodedFrame::from_png(image, hotspot, png.to_vec())));
    }

    let image = decode_bitmap(&view, offset)?;
    Ok(checked(DecodedFrame::new(image, hotspot)))
}

fn checked(frame: DecodedFrame) -> DecodedFrame {
    let size = frame.dimensions();
    if !size.contains(frame.hotspot) {
        debug!(
            "frame: hotspot ({}, {}) lies outside the {}x{} image, clamping",
            frame.hotspot.x, frame.hotspot.y, size.width, size.height
        );
    }
    frame
}

/// Reads the hotspot, substituting the image center for icon resources
/// where those fields hold plane and bit counts instead.
fn read_hotspot(view: &ByteView<'_>) -> Result<Hotspot> {
    let kind = view.u16_le(2)?;
    if kind == CURSOR_RESOURCE {
        return Ok(Hotspot::new(
            view.u16_le(10)? as u32,
            view.u16_le(12)? as u32,
        ));
    }
    let width = match view.u8(6)? {
        0 => 256,
        w => w as u32,
    };
    let height = match view.u8(7)? {
        0 => 256,
        h => h as u32,
    };
    Ok(Hotspot::new(width / 2, height / 2))
}

/// Row stride in bytes of a bitmap with 32-bit aligned rows.
fn stride(width: u32, bpp: u16) -> usize {
    ((width as usize * bpp as usize).div_ceil(32)) * 4
}

fn decode_bitmap(view: &ByteView<'_>, offset: usize) -> Result<RgbaImage> {
    let header_size = view.u32_le(offset)?;
    if header_size < MIN_BITMAP_HEADER {
        return Err(FormatError::BadBitmapHeader(header_size));
    }
    let raw_width = view.i32_le(offset + 4)?;
    let raw_height = view.i32_le(offset + 8)?;
    let bpp = view.u16_le(offset + 14)?;

    let width = u32::try_from(raw_width).unwrap_or(0);
    let height = raw_height.unsigned_abs() / 2;
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(FormatError::BadDimensions {
            width: raw_width as i64,
            height: raw_height as i64 / 2,
        });
    }
    if !matches!(bpp, 1 | 4 | 8 | 24 | 32) {
        return Err(FormatError::UnsupportedBitDepth(bpp));
    }

    let mut pixels_at = offset
        .checked_add(header_size as usize)
        .ok_or_else(|| FormatError::truncated(offset, header_size as usize, view.len()))?;

    let palette = if bpp <= 8 {
        let entries = 1usize << bpp;
        let table = view.slice(pixels_at, entries * 4)?;
        pixels_at += entries * 4;
        // Stored as B, G, R, reserved.
        table.chunks_exact(4).map(|c| [c[2], c[1], c[0]]).collect()
    } else {
        Vec::new()
    };

    let color_stride = stride(width, bpp);
    let mask_stride = stride(width, 1);
    let rows = height as usize;
    let color = view.slice(pixels_at, color_stride * rows)?;
    // 32-bit images carry alpha; their mask is optional and ignored.
    let mask = if bpp == 32 {
        None
    } else {
        Some(view.slice(pixels_at + color_stride * rows, mask_stride * rows)?)
    };

    let mut image = RgbaImage::new(width, height);
    for y in 0..rows {
        // Rows are stored bottom-up.
        let src = rows - 1 - y;
        let row = &color[src * color_stride..(src + 1) * color_stride];
        let mask_row = mask.map(|m| &m[src * mask_stride..(src + 1) * mask_stride]);

        for x in 0..width as usize {
            let [r, g, b, mut a] = match bpp {
                32 => {
                    let p = &row[x * 4..x * 4 + 4];
                    [p[2], p[1], p[0], p[3]]
                }
                24 => {
                    let p = &row[x * 3..x * 3 + 3];
                    [p[2], p[1], p[0], 255]
                }
                _ => {
                    let [r, g, b] = palette[palette_index(row, x, bpp)];
                    [r, g, b, 255]
                }
            };
            if let Some(mask_row) = mask_row {
                if (mask_row[x >> 3] >> (7 - (x & 7))) & 1 == 1 {
                    a = 0;
                }
            }
            image.put_pixel(x as u32, y as u32, Rgba([r, g, b, a]));
        }
    }

    Ok(image)
}

/// Extracts a color table index from a packed indexed row (MSB first).
fn palette_index(row: &[u8], x: usize, bpp: u16) -> usize {
    match bpp {
        8 => row[x] as usize,
        4 => ((row[x >> 1] >> if x & 1 == 0 { 4 } else { 0 }) & 0x0f) as usize,
        _ => ((row[x >> 3] >> (7 - (x & 7))) & 1) as usize,
    }
}

// ============================================================================
// Tests
// ============================================================================
