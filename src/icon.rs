//! Decoded cursor image types.
//!
//! A cursor is presented as an RGBA image plus a hotspot designating the
//! pointer's logical tip. Animated cursors are a [`FrameSet`]: decoded frames
//! together with the playback order and per-step timing.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

/// Pixel offset of the pointer tip within a cursor image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

impl Hotspot {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Clamps the hotspot into an image of the given size.
    ///
    /// Malformed files may declare hotspots outside the image; presenters
    /// expect a point inside it.
    pub fn clamped_to(self, size: SizePx) -> Self {
        Self {
            x: self.x.min(size.width.saturating_sub(1)),
            y: self.y.min(size.height.saturating_sub(1)),
        }
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if the hotspot lies inside this size.
    pub fn contains(&self, hotspot: Hotspot) -> bool {
        hotspot.x < self.width && hotspot.y < self.height
    }
}

/// One decoded cursor frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// The image data in RGBA format, top-down.
    pub image: RgbaImage,

    /// Hotspot as declared by the frame. May lie outside the image for
    /// malformed input; use [`DecodedFrame::clamped_hotspot`] to present it.
    pub hotspot: Hotspot,

    /// The original PNG payload when the frame embedded one.
    png: Option<Vec<u8>>,
}

impl DecodedFrame {
    /// Creates a frame decoded from a raw bitmap.
    pub fn new(image: RgbaImage, hotspot: Hotspot) -> Self {
        Self {
            image,
            hotspot,
            png: None,
        }
    }

    /// Creates a frame decoded from an embedded PNG, keeping the payload.
    pub fn from_png(image: RgbaImage, hotspot: Hotspot, png: Vec<u8>) -> Self {
        Self {
            image,
            hotspot,
            png: Some(png),
        }
    }

    /// Returns the pixel dimensions of the image.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.image.width(), self.image.height())
    }

    /// Returns the hotspot clamped into the image.
    pub fn clamped_hotspot(&self) -> Hotspot {
        self.hotspot.clamped_to(self.dimensions())
    }

    /// Returns true if this frame was decoded from an embedded PNG.
    pub fn is_png(&self) -> bool {
        self.png.is_some()
    }

    /// Returns the embedded PNG payload, if any.
    pub fn embedded_png(&self) -> Option<&[u8]> {
        self.png.as_deref()
    }

    /// Returns PNG bytes for presentation.
    ///
    /// Embedded payloads are returned verbatim; bitmap frames are encoded.
    pub fn png_bytes(&self) -> Result<Vec<u8>, image::ImageError> {
        if let Some(png) = &self.png {
            return Ok(png.clone());
        }
        let mut out = Cursor::new(Vec::new());
        self.image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// Decoded frames plus the timing needed to animate them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSet {
    /// Frames in declared order.
    pub frames: Vec<DecodedFrame>,

    /// Frame index per playback step. `None` plays frames in order.
    pub sequence: Option<Vec<usize>>,

    /// Delay per playback step in 1/60 s ticks.
    pub rates: Option<Vec<u32>>,

    /// Default delay in 1/60 s ticks.
    pub display_rate: u32,
}

impl FrameSet {
    /// A single static frame; never animates.
    pub fn single(frame: DecodedFrame) -> Self {
        Self {
            frames: vec![frame],
            sequence: None,
            rates: None,
            display_rate: 0,
        }
    }

    /// Number of playback steps.
    pub fn len(&self) -> usize {
        match &self.sequence {
            Some(seq) => seq.len(),
            None => self.frames.len(),
        }
    }

    /// Returns true if there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the frame shown at a playback step.
    pub fn frame_at(&self, step: usize) -> Option<&DecodedFrame> {
        let index = match &self.sequence {
            Some(seq) => *seq.get(step)?,
            None => step,
        };
        self.frames.get(index)
    }

    /// Returns the delay after a playback step, in milliseconds.
    pub fn delay_ms(&self, step: usize) -> u64 {
        let ticks = self
            .rates
            .as_ref()
            .and_then(|rates| rates.get(step).copied())
            .unwrap_or(self.display_rate);
        ticks_to_ms(ticks)
    }

    /// Returns true if more than one step exists.
    pub fn is_animated(&self) -> bool {
        self.len() > 1
    }
}

/// Converts 1/60 s ticks to whole milliseconds.
pub fn ticks_to_ms(ticks: u32) -> u64 {
    (ticks as f64 * 1000.0 / 60.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn hotspot_clamping() {
        let size = SizePx::new(32, 16);
        assert_eq!(Hotspot::new(40, 3).clamped_to(size), Hotspot::new(31, 3));
        assert_eq!(Hotspot::new(5, 99).clamped_to(size), Hotspot::new(5, 15));
        assert!(size.contains(Hotspot::new(31, 15)));
        assert!(!size.contains(Hotspot::new(32, 0)));
    }

    #[test]
    fn bitmap_frame_encodes_png() {
        let frame = DecodedFrame::new(solid(4, 4, [255, 0, 0, 255]), Hotspot::default());
        assert!(!frame.is_png());

        let png = frame.png_bytes().unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back.get_pixel(2, 2).0, [255, 0, 0, 255]);
    }

    #[test]
    fn png_frame_returns_payload_verbatim() {
        let payload = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let frame = DecodedFrame::from_png(solid(1, 1, [0; 4]), Hotspot::new(0, 0), payload.clone());
        assert_eq!(frame.png_bytes().unwrap(), payload);
        assert_eq!(frame.embedded_png(), Some(payload.as_slice()));
    }

    #[test]
    fn frame_set_sequence_and_rates() {
        let a = DecodedFrame::new(solid(1, 1, [1, 0, 0, 255]), Hotspot::default());
        let b = DecodedFrame::new(solid(1, 1, [2, 0, 0, 255]), Hotspot::default());
        let set = FrameSet {
            frames: vec![a, b],
            sequence: Some(vec![1, 0, 1]),
            rates: Some(vec![6, 12, 60]),
            display_rate: 10,
        };

        assert_eq!(set.len(), 3);
        assert!(set.is_animated());
        assert_eq!(set.frame_at(0).unwrap().image.get_pixel(0, 0)[0], 2);
        assert_eq!(set.frame_at(1).unwrap().image.get_pixel(0, 0)[0], 1);
        assert!(set.frame_at(3).is_none());
        assert_eq!(set.delay_ms(0), 100);
        assert_eq!(set.delay_ms(1), 200);
        assert_eq!(set.delay_ms(2), 1000);
    }

    #[test]
    fn ticks_round_to_milliseconds() {
        assert_eq!(ticks_to_ms(1), 17);
        assert_eq!(ticks_to_ms(12), 200);
        assert_eq!(ticks_to_ms(0), 0);
    }
}
