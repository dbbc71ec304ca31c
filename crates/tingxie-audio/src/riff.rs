//! Lazy walking of RIFF sub-chunks.
//!
//! [`Chunks`] yields every sub-chunk after the 12-byte `RIFF`/`WAVE` header in
//! file order. Declared sizes are trusted for advancing but never for slicing:
//! a chunk whose declared size runs past the end of the buffer is clamped to
//! the bytes that are actually there, and iteration stops after it.

pub const RIFF_HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;

/// Cheap magic-byte check: `RIFF` at offset 0 and `WAVE` at offset 8.
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= RIFF_HEADER_LEN && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub id: [u8; 4],
    /// Offset of the chunk header within the buffer.
    pub offset: usize,
    /// Size field as written in the chunk header.
    pub declared_len: u32,
    /// Chunk body, clamped to the available bytes.
    pub body: &'a [u8],
}

impl Chunk<'_> {
    pub fn body_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_LEN
    }

    pub fn is_truncated(&self) -> bool {
        self.body.len() < self.declared_len as usize
    }
}

pub struct Chunks<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Chunks<'a> {
    /// Iterate the sub-chunks of a RIFF buffer. The form header is not
    /// validated here; see [`is_wav`].
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: RIFF_HEADER_LEN,
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header_end = self.pos.checked_add(CHUNK_HEADER_LEN)?;
        if header_end > self.buf.len() {
            return None;
        }

        let offset = self.pos;
        let mut id = [0u8; 4];
        id.copy_from_slice(&self.buf[offset..offset + 4]);
        let declared_len = read_u32_le(self.buf, offset + 4)?;

        let available = self.buf.len() - header_end;
        let body_len = (declared_len as usize).min(available);
        let body = &self.buf[header_end..header_end + body_len];

        if body_len < declared_len as usize {
            // Truncated: nothing meaningful can follow.
            self.pos = self.buf.len();
        } else {
            // Odd-sized bodies are followed by a pad byte.
            let padded = declared_len as usize + (declared_len as usize & 1);
            self.pos = header_end.saturating_add(padded);
        }

        Some(Chunk {
            id,
            offset,
            declared_len,
            body,
        })
    }
}

pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    let bytes = buf.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
