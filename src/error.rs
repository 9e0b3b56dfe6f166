//! Error types for cursor decoding and loading.
//!
//! Decoders return [`FormatError`] synchronously. Loading a cursor from a URL
//! can additionally fail on the fetch, which is reported as [`LoadError::Io`].
//! Neither error ever escapes the runtime: failures are logged and the
//! previous presentation state is kept.

use thiserror::Error;

/// Result type for the binary decoders.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Malformed or unsupported binary input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a RIFF container (leading tag {0:?})")]
    BadContainerTag([u8; 4]),

    #[error("RIFF form type {0:?} is not ACON")]
    BadFormType([u8; 4]),

    #[error("truncated input: need {needed} bytes at offset {offset}, have {len}")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("chunk {tag:?} at offset {offset} declares {size} bytes past the end of its parent")]
    ChunkOverrun {
        tag: [u8; 4],
        offset: usize,
        size: u32,
    },

    #[error("anih chunk is too short to hold a header")]
    BadHeaderChunk,

    #[error("rate table has {rates} entries but playback has {steps} steps")]
    RateTableMismatch { rates: usize, steps: usize },

    #[error("sequence index {index} is out of range for {frames} frames")]
    SequenceIndexOutOfRange { index: u32, frames: usize },

    #[error("container holds no icon frames")]
    NoFrames,

    #[error("invalid bitmap dimensions {width}x{height}")]
    BadDimensions { width: i64, height: i64 },

    #[error("bitmap header of {0} bytes is too small")]
    BadBitmapHeader(u32),

    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u16),

    #[error("embedded PNG could not be decoded: {0}")]
    Png(String),
}

impl FormatError {
    /// Builds a [`FormatError::Truncated`] for a read of `needed` bytes at `offset`.
    pub(crate) fn truncated(offset: usize, needed: usize, len: usize) -> Self {
        Self::Truncated {
            offset,
            needed,
            len,
        }
    }
}

/// Failure to load a cursor resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to fetch {url}: {reason}")]
    Io { url: String, reason: String },
}

impl LoadError {
    /// Creates an I/O error for the given URL.
    pub fn io(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Io {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the input bytes were at fault rather than the transport.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}
