use crate::riff::{self, Chunks};
use std::ops::Range;
use tingxie_core::WavError;

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

const FMT_MIN_LEN: usize = 16;
// cbSize(2) + validBits(2) + channelMask(4) precede the sub-format GUID.
const EXTENSIBLE_SUBFORMAT_OFFSET: usize = 24;

/// Parsed view of a RIFF/WAVE buffer. Offsets refer to the buffer it was
/// parsed from and are only meaningful together with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavDescriptor {
    pub format_tag: u16,
    /// First two bytes of the sub-format GUID for `WAVE_FORMAT_EXTENSIBLE`.
    pub sub_format: Option<u16>,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Body of the `fmt ` sub-chunk.
    pub fmt_range: Range<usize>,
    pub data_offset: usize,
    /// Length of the sample region, clamped to the bytes present.
    pub data_len: usize,
}

impl WavDescriptor {
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < 4 || &bytes[0..4] != b"RIFF" {
            return Err(WavError::NotRiff);
        }
        if !riff::is_wav(bytes) {
            return Err(WavError::NotWave);
        }

        let mut fmt = None;
        let mut data = None;
        for chunk in Chunks::new(bytes) {
            match &chunk.id {
                b"fmt " if fmt.is_none() => fmt = Some(chunk),
                b"data" if data.is_none() => {
                    if chunk.is_truncated() {
                        tracing::debug!(
                            declared = chunk.declared_len,
                            available = chunk.body.len(),
                            "data chunk truncated, clamping"
                        );
                    }
                    data = Some(chunk);
                }
                _ => {}
            }
            if fmt.is_some() && data.is_some() {
                break;
            }
        }

        let fmt = fmt.ok_or(WavError::MissingFmt)?;
        let data = data.ok_or(WavError::MissingData)?;
        let body = fmt.body;
        if body.len() < FMT_MIN_LEN {
            return Err(WavError::FmtTooShort(body.len()));
        }

        let format_tag = riff::read_u16_le(body, 0).ok_or(WavError::FmtTooShort(body.len()))?;
        let sub_format = if format_tag == WAVE_FORMAT_EXTENSIBLE {
            riff::read_u16_le(body, EXTENSIBLE_SUBFORMAT_OFFSET)
        } else {
            None
        };
        let field_u16 = |at| riff::read_u16_le(body, at).ok_or(WavError::FmtTooShort(body.len()));
        let field_u32 = |at| riff::read_u32_le(body, at).ok_or(WavError::FmtTooShort(body.len()));

        Ok(Self {
            format_tag,
            sub_format,
            channels: field_u16(2)?,
            sample_rate: field_u32(4)?,
            byte_rate: field_u32(8)?,
            block_align: field_u16(12)?,
            bits_per_sample: field_u16(14)?,
            fmt_range: fmt.body_offset()..fmt.body_offset() + body.len(),
            data_offset: data.body_offset(),
            data_len: data.body.len(),
        })
    }

    /// Uncompressed integer PCM, either plainly tagged or via the extensible
    /// header's sub-format.
    pub fn is_pcm(&self) -> bool {
        match self.format_tag {
            WAVE_FORMAT_PCM => true,
            WAVE_FORMAT_EXTENSIBLE => self.sub_format == Some(WAVE_FORMAT_PCM),
            _ => false,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Bytes per frame (one sample for every channel).
    pub fn frame_len(&self) -> usize {
        self.channels as usize * self.bytes_per_sample()
    }

    pub fn frame_count(&self) -> usize {
        match self.frame_len() {
            0 => 0,
            len => self.data_len / len,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn fmt_body<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.fmt_range.clone()]
    }

    pub fn data<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.data_offset..self.data_offset + self.data_len]
    }
}
