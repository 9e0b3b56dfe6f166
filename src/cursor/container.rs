//! RIFF/ACON animated cursor container.
//!
//! Layout:
//!
//! ```text
//! "RIFF" <u32 size> "ACON"
//! chunk*              chunk = <tag:4> <u32-le size> <payload> [pad byte if size is odd]
//!
//! "anih"  header; display rate (1/60 s ticks) at payload offset 28
//! "rate"  u32-le delay per playback step
//! "seq "  u32-le frame index per playback step
//! "LIST" "fram" { "icon" <icon/cursor file> }*
//! "LIST" <other>  transparent wrapper, its chunks are read in place
//! ```
//!
//! Every size field is bounds-checked against its parent; a chunk that claims
//! more bytes than remain is a [`FormatError::ChunkOverrun`].

use super::frame;
use super::ByteView;
use crate::error::{FormatError, Result};
use crate::icon::FrameSet;

const RIFF: [u8; 4] = *b"RIFF";
const ACON: [u8; 4] = *b"ACON";
const ANIH: [u8; 4] = *b"anih";
const RATE: [u8; 4] = *b"rate";
const SEQ: [u8; 4] = *b"seq ";
const LIST: [u8; 4] = *b"LIST";
const FRAM: [u8; 4] = *b"fram";
const ICON: [u8; 4] = *b"icon";

const PREAMBLE_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Display rate used when the container has no header chunk.
pub const DEFAULT_DISPLAY_RATE: u32 = 12;

// ============================================================================
// Header
// ============================================================================

/// Contents of the `anih` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AniHeader {
    pub header_size: u32,
    pub frame_count: u32,
    pub step_count: u32,
    pub width: u32,
    pub height: u32,
    pub bit_count: u32,
    pub planes: u32,
    /// Default delay in 1/60 s ticks.
    pub display_rate: u32,
    pub flags: u32,
}

impl AniHeader {
    /// Flag bit: frames are icon/cursor structures rather than raw data.
    pub const FLAG_ICON: u32 = 0x1;
    /// Flag bit: the container carries a `seq ` chunk.
    pub const FLAG_SEQUENCE: u32 = 0x2;

    fn parse(payload: &[u8]) -> Result<Self> {
        let view = ByteView::new(payload);
        if view.len() < 32 {
            return Err(FormatError::BadHeaderChunk);
        }
        Ok(Self {
            header_size: view.u32_le(0)?,
            frame_count: view.u32_le(4)?,
            step_count: view.u32_le(8)?,
            width: view.u32_le(12)?,
            height: view.u32_le(16)?,
            bit_count: view.u32_le(20)?,
            planes: view.u32_le(24)?,
            display_rate: view.u32_le(28)?,
            flags: view.u32_le(32).unwrap_or(0),
        })
    }
}

// ============================================================================
// Chunk walking
// ============================================================================

/// One chunk of a RIFF stream.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Chunk<'a> {
    pub tag: [u8; 4],
    pub offset: usize,
    pub size: u32,
    pub payload: &'a [u8],
}

/// Iterates the chunks in `[pos, end)`.
///
/// Stops when fewer than 8 bytes remain. After an error the iterator is
/// exhausted.
pub(crate) struct Chunks<'a> {
    view: ByteView<'a>,
    pos: usize,
    end: usize,
    failed: bool,
}

impl<'a> Chunks<'a> {
    pub(crate) fn new(data: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            view: ByteView::new(data),
            pos: start,
            end: end.min(data.len()),
            failed: false,
        }
    }

    /// Continues inside a `LIST` chunk instead of skipping it.
    fn descend(&mut self, list: &Chunk<'a>) {
        self.pos = list.offset + CHUNK_HEADER_LEN + 4;
    }

    fn read(&mut self) -> Result<Chunk<'a>> {
        let tag = self.view.tag(self.pos)?;
        let size = self.view.u32_le(self.pos + 4)?;
        let body = self.pos + CHUNK_HEADER_LEN;
        let body_end = body
            .checked_add(size as usize)
            .filter(|end| *end <= self.end)
            .ok_or(FormatError::ChunkOverrun {
                tag,
                offset: self.pos,
                size,
            })?;

        let chunk = Chunk {
            tag,
            offset: self.pos,
            size,
            payload: self.view.slice(body, size as usize)?,
        };
        // A trailing pad byte may be missing on the last chunk.
        self.pos = (body_end + (size as usize & 1)).min(self.end);
        Ok(chunk)
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.end.saturating_sub(self.pos) < CHUNK_HEADER_LEN {
            return None;
        }
        let chunk = self.read();
        if chunk.is_err() {
            self.failed = true;
        }
        Some(chunk)
    }
}

fn read_u32_table(payload: &[u8]) -> Vec<u32> {
    payload
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

// ============================================================================
// Container
// ============================================================================

/// Parsed animated cursor container.
///
/// Frames borrow from the input buffer; each is a complete icon/cursor
/// structure ready for [`frame::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedIconContainer<'a> {
    /// The `anih` header, if present.
    pub header: Option<AniHeader>,

    /// Raw icon frames in declared order.
    pub frames: Vec<&'a [u8]>,

    /// Default delay in 1/60 s ticks.
    pub display_rate: u32,

    /// Per-step delays, one per playback step.
    pub rates: Option<Vec<u32>>,

    /// Frame index per playback step.
    pub sequence: Option<Vec<u32>>,
}

impl<'a> AnimatedIconContainer<'a> {
    /// Number of playback steps.
    pub fn playback_len(&self) -> usize {
        self.sequence
            .as_ref()
            .map_or(self.frames.len(), |seq| seq.len())
    }

    /// Decodes every frame. Fails on the first malformed frame; no partial
    /// set is ever returned.
    pub fn decode_frames(&self) -> Result<FrameSet> {
        if self.frames.is_empty() {
            return Err(FormatError::NoFrames);
        }
        let frames = self
            .frames
            .iter()
            .map(|blob| frame::decode(blob))
            .collect::<Result<Vec<_>>>()?;

        Ok(FrameSet {
            frames,
            sequence: self
                .sequence
                .as_ref()
                .map(|seq| seq.iter().map(|i| *i as usize).collect()),
            rates: self.rates.clone(),
            display_rate: self.display_rate,
        })
    }

    fn validate(&self) -> Result<()> {
        if let Some(seq) = &self.sequence {
            if let Some(&index) = seq.iter().find(|i| **i as usize >= self.frames.len()) {
                return Err(FormatError::SequenceIndexOutOfRange {
                    index,
                    frames: self.frames.len(),
                });
            }
        }
        if let Some(rates) = &self.rates {
            if rates.len() != self.playback_len() {
                return Err(FormatError::RateTableMismatch {
                    rates: rates.len(),
                    steps: self.playback_len(),
                });
            }
        }
        Ok(())
    }
}

/// Returns true if `data` starts with the animated container preamble.
pub fn is_animated_container(data: &[u8]) -> bool {
    data.len() >= PREAMBLE_LEN && data[0..4] == RIFF && data[8..12] == ACON
}

/// Parses an animated cursor container.
pub fn parse(data: &[u8]) -> Result<AnimatedIconContainer<'_>> {
    let view = ByteView::new(data);
    let tag = view.tag(0)?;
    if tag != RIFF {
        return Err(FormatError::BadContainerTag(tag));
    }
    let form = view.tag(8)?;
    if form != ACON {
        return Err(FormatError::BadFormType(form));
    }

    let mut container = AnimatedIconContainer {
        header: None,
        frames: Vec::new(),
        display_rate: DEFAULT_DISPLAY_RATE,
        rates: None,
        sequence: None,
    };

    let mut chunks = Chunks::new(data, PREAMBLE_LEN, data.len());
    while let Some(chunk) = chunks.next() {
        let chunk = chunk?;
        match chunk.tag {
            ANIH => {
                let header = AniHeader::parse(chunk.payload)?;
                container.display_rate = header.display_rate;
                container.header = Some(header);
            }
            RATE => container.rates = Some(read_u32_table(chunk.payload)),
            SEQ => container.sequence = Some(read_u32_table(chunk.payload)),
            LIST => {
                let kind = ByteView::new(chunk.payload).tag(0).map_err(|_| {
                    FormatError::ChunkOverrun {
                        tag: LIST,
                        offset: chunk.offset,
                        size: chunk.size,
                    }
                })?;
                if kind == FRAM {
                    let start = chunk.offset + CHUNK_HEADER_LEN + 4;
                    let end = chunk.offset + CHUNK_HEADER_LEN + chunk.size as usize;
                    for entry in Chunks::new(data, start, end) {
                        let entry = entry?;
                        if entry.tag == ICON {
                            container.frames.push(entry.payload);
                        }
                    }
                } else {
                    chunks.descend(&chunk);
                }
            }
            _ => {}
        }
    }

    container.validate()?;
    Ok(container)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Serializes one chunk with RIFF padding.
    pub(crate) fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() + 9);
        out.extend_from_slice(tag);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    pub(crate) fn list(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut payload = kind.to_vec();
        payload.extend_from_slice(body);
        chunk(b"LIST", &payload)
    }

    pub(crate) fn anih(display_rate: u32, frames: u32) -> Vec<u8> {
        let fields = [36, frames, frames, 0, 0, 0, 0, display_rate, AniHeader::FLAG_ICON];
        let payload: Vec<u8> = fields.iter().flat_map(|v| v.to_le_bytes()).collect();
        chunk(b"anih", &payload)
    }

    pub(crate) fn table(tag: &[u8; 4], values: &[u32]) -> Vec<u8> {
        let payload: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        chunk(tag, &payload)
    }

    pub(crate) fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(b"ACON");
        out.extend_from_slice(&body);
        out
    }

    fn frame_list(frames: &[&[u8]]) -> Vec<u8> {
        let body: Vec<u8> = frames.iter().flat_map(|f| chunk(b"icon", f)).collect();
        list(b"fram", &body)
    }

    #[test]
    fn minimal_container() {
        let icon = [1u8, 2, 3, 4, 5, 6];
        let data = riff(&[anih(7, 1), frame_list(&[&icon])]);

        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.frames.len(), 1);
        assert_eq!(parsed.frames[0], &icon[..]);
        assert_eq!(parsed.display_rate, 7);
        assert_eq!(parsed.header.unwrap().frame_count, 1);
        assert!(parsed.rates.is_none());
        assert!(parsed.sequence.is_none());
        assert_eq!(parsed.playback_len(), 1);
    }

    #[test]
    fn rejects_wrong_container_tag() {
        let mut data = riff(&[anih(7, 0)]);
        data[0..4].copy_from_slice(b"JUNK");
        assert_eq!(parse(&data), Err(FormatError::BadContainerTag(*b"JUNK")));
    }

    #[test]
    fn rejects_wrong_form_type() {
        let mut data = riff(&[]);
        data[8..12].copy_from_slice(b"WAVE");
        assert_eq!(parse(&data), Err(FormatError::BadFormType(*b"WAVE")));
    }

    #[test]
    fn rejects_short_preamble() {
        assert!(matches!(parse(b"RIFF"), Err(FormatError::Truncated { .. })));
    }

    #[test]
    fn odd_sized_frames_are_padded() {
        let a = [9u8; 3];
        let b = [8u8; 5];
        let data = riff(&[frame_list(&[&a, &b]), anih(3, 2)]);

        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.frames, vec![&a[..], &b[..]]);
        assert_eq!(parsed.display_rate, 3);
    }

    #[test]
    fn sequence_and_rates() {
        let a = [1u8; 4];
        let b = [2u8; 4];
        let data = riff(&[
            anih(10, 2),
            table(b"rate", &[5, 6, 7]),
            table(b"seq ", &[0, 1, 0]),
            frame_list(&[&a, &b]),
        ]);

        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.rates, Some(vec![5, 6, 7]));
        assert_eq!(parsed.sequence, Some(vec![0, 1, 0]));
        assert_eq!(parsed.playback_len(), 3);
    }

    #[test]
    fn sequence_index_out_of_range() {
        let a = [1u8; 4];
        let data = riff(&[table(b"seq ", &[0, 3]), frame_list(&[&a])]);
        assert_eq!(
            parse(&data),
            Err(FormatError::SequenceIndexOutOfRange { index: 3, frames: 1 })
        );
    }

    #[test]
    fn rate_table_length_mismatch() {
        let a = [1u8; 4];
        let data = riff(&[table(b"rate", &[5, 6]), frame_list(&[&a])]);
        assert_eq!(
            parse(&data),
            Err(FormatError::RateTableMismatch { rates: 2, steps: 1 })
        );
    }

    #[test]
    fn other_lists_are_transparent() {
        let info = list(b"INFO", &chunk(b"INAM", b"name"));
        let mut wrapped = b"LIST".to_vec();
        let inner = anih(4, 0);
        wrapped.extend_from_slice(&(inner.len() as u32 + 4).to_le_bytes());
        wrapped.extend_from_slice(b"wrap");
        wrapped.extend_from_slice(&inner);

        let a = [1u8; 2];
        let data = riff(&[info, wrapped, frame_list(&[&a])]);
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.display_rate, 4);
        assert_eq!(parsed.frames.len(), 1);
    }

    #[test]
    fn unknown_chunks_in_frame_list_are_skipped() {
        let body = [chunk(b"icon", &[1, 1]), chunk(b"junk", &[0; 3]), chunk(b"icon", &[2, 2])].concat();
        let data = riff(&[list(b"fram", &body)]);
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.frames, vec![&[1u8, 1][..], &[2u8, 2][..]]);
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let mut data = riff(&[anih(1, 0)]);
        // Inflate the anih size field past the end of the buffer.
        data[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            parse(&data),
            Err(FormatError::ChunkOverrun { tag: ANIH, .. })
        ));
    }

    #[test]
    fn oversized_frame_entry_is_rejected() {
        let mut fram = list(b"fram", &chunk(b"icon", &[0; 4]));
        // icon size lives after LIST header (8) + "fram" (4) + "icon" (4).
        fram[16..20].copy_from_slice(&100u32.to_le_bytes());
        let data = riff(&[fram]);
        assert!(matches!(
            parse(&data),
            Err(FormatError::ChunkOverrun { tag: ICON, .. })
        ));
    }

    #[test]
    fn short_header_chunk_is_rejected() {
        let data = riff(&[chunk(b"anih", &[0; 16])]);
        assert_eq!(parse(&data), Err(FormatError::BadHeaderChunk));
    }

    #[test]
    fn empty_list_is_rejected() {
        let data = riff(&[chunk(b"LIST", &[])]);
        assert!(matches!(parse(&data), Err(FormatError::ChunkOverrun { tag: LIST, .. })));
    }

    #[test]
    fn chunk_offsets_advance_by_padded_size() {
        let data = [
            chunk(b"aaaa", &[0; 3]),
            chunk(b"bbbb", &[0; 4]),
            chunk(b"cccc", &[0; 1]),
            chunk(b"dddd", &[]),
        ]
        .concat();

        let chunks: Vec<_> = Chunks::new(&data, 0, data.len())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(chunks.len(), 4);
        for pair in chunks.windows(2) {
            let size = pair[0].size as usize;
            assert_eq!(pair[1].offset, pair[0].offset + 8 + size + (size & 1));
        }
    }

    #[test]
    fn adversarial_sizes_never_read_out_of_bounds() {
        let icon = [7u8; 6];
        let base = riff(&[anih(7, 1), table(b"rate", &[1]), frame_list(&[&icon])]);

        // Overwrite every 4-byte window with hostile sizes; parsing must
        // either succeed or fail cleanly, never panic.
        for offset in 12..base.len().saturating_sub(4) {
            for hostile in [0u32, 1, 3, 0x7fff_ffff, u32::MAX, base.len() as u32] {
                let mut data = base.clone();
                data[offset..offset + 4].copy_from_slice(&hostile.to_le_bytes());
                let _ = parse(&data);
            }
        }

        // Truncations at every length must also be handled.
        for len in 0..base.len() {
            let _ = parse(&base[..len]);
        }
    }

    #[test]
    fn decode_frames_requires_frames() {
        let data = riff(&[anih(7, 0)]);
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.decode_frames(), Err(FormatError::NoFrames));
    }

    #[test]
    fn is_animated_container_checks_preamble() {
        assert!(is_animated_container(&riff(&[])));
        assert!(!is_animated_container(b"RIFF\0\0\0\0WAVE"));
        assert!(!is_animated_container(&[0, 0, 2, 0]));
    }
}
