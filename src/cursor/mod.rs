//! Animated cursor decoding and playback.
//!
//! - [`container`] walks the RIFF/ACON envelope of an animated cursor and
//!   captures the raw icon frames and timing tables.
//! - [`frame`] decodes one icon/cursor structure into an RGBA image and hotspot.
//! - [`player`] owns a decoded [`FrameSet`](crate::FrameSet) and steps through
//!   it on its own timer, presenting each frame through a [`CursorPresenter`].

pub mod container;
pub mod frame;
pub mod player;

pub use container::{AniHeader, AnimatedIconContainer, parse};
pub use frame::decode;
pub use player::{CursorAnimationController, LoadTicket, PlaybackTimer, decode_cursor};

use crate::error::{FormatError, LoadError, Result};
use crate::icon::{DecodedFrame, Hotspot};

// ============================================================================
// Collaborators
// ============================================================================

/// Fetches binary resources by URL.
pub trait BinaryFetcher {
    fn fetch(&mut self, url: &str) -> std::result::Result<Vec<u8>, LoadError>;
}

/// Makes a decoded frame the visible pointer image.
pub trait CursorPresenter {
    /// Presents `frame` with the given (already clamped) hotspot.
    fn present(&mut self, frame: &DecodedFrame, hotspot: Hotspot);

    /// Restores the platform default pointer.
    fn clear(&mut self);
}

// ============================================================================
// Byte access
// ============================================================================

/// Bounds-checked little-endian reads over a byte slice.
#[derive(Clone, Copy)]
pub(crate) struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `len` bytes starting at `offset`.
    pub(crate) fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .map(|end| &self.data[offset..end])
            .ok_or_else(|| FormatError::truncated(offset, len, self.data.len()))
    }

    pub(crate) fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub(crate) fn tag(&self, offset: usize) -> Result<[u8; 4]> {
        self.array::<4>(offset)
    }

    pub(crate) fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    pub(crate) fn u16_le(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array(offset)?))
    }

    pub(crate) fn u32_le(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array(offset)?))
    }

    pub(crate) fn i32_le(&self, offset: usize) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array(offset)?))
    }
}
