//! Leading/trailing silence removal for PCM WAV buffers.
//!
//! Silence is judged per frame: the loudest channel in a frame decides. A
//! frame is silent when that amplitude, as a fraction of the bit depth's full
//! scale, is below [`SILENCE_THRESHOLD`]. The scan moves one frame at a time.
//!
//! Trimming never fails. Anything that cannot be trimmed safely (not RIFF,
//! not PCM, unusual bit depth, all silence) comes back unchanged with
//! `trimmed == false`.

use crate::wav::WavDescriptor;
use std::borrow::Cow;

/// Fraction of full scale below which a frame counts as silent.
pub const SILENCE_THRESHOLD: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimParams {
    pub threshold: f32,
    /// Audio kept on each side of the detected sound, in milliseconds.
    pub margin_ms: u32,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            threshold: SILENCE_THRESHOLD,
            margin_ms: 0,
        }
    }
}

impl TrimParams {
    pub fn with_margin_ms(margin_ms: u32) -> Self {
        Self {
            margin_ms,
            ..Self::default()
        }
    }

    fn margin_frames(&self, sample_rate: u32) -> usize {
        (sample_rate as u64 * self.margin_ms as u64 / 1000) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimResult<'a> {
    pub audio: Cow<'a, [u8]>,
    pub trimmed: bool,
}

impl<'a> TrimResult<'a> {
    fn unchanged(bytes: &'a [u8]) -> Self {
        Self {
            audio: Cow::Borrowed(bytes),
            trimmed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleWidth {
    /// 8-bit WAV samples are unsigned, centered on 128.
    U8,
    I16,
    I24,
    I32,
}

impl SampleWidth {
    fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(Self::U8),
            16 => Some(Self::I16),
            24 => Some(Self::I24),
            32 => Some(Self::I32),
            _ => None,
        }
    }

    fn len(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I16 => 2,
            Self::I24 => 3,
            Self::I32 => 4,
        }
    }

    /// Absolute amplitude of one little-endian sample, normalized to 0.0..=1.0.
    fn amplitude(self, sample: &[u8]) -> f32 {
        match self {
            Self::U8 => (sample[0] as i32 - 128).unsigned_abs() as f32 / 128.0,
            Self::I16 => {
                i16::from_le_bytes([sample[0], sample[1]]).unsigned_abs() as f32 / 32_768.0
            }
            Self::I24 => {
                let value = i32::from_le_bytes([0, sample[0], sample[1], sample[2]]) >> 8;
                value.unsigned_abs() as f32 / 8_388_608.0
            }
            Self::I32 => {
                let value = i32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
                (value.unsigned_abs() as f64 / 2_147_483_648.0) as f32
            }
        }
    }
}

fn frame_amplitude(frame: &[u8], width: SampleWidth) -> f32 {
    frame
        .chunks_exact(width.len())
        .map(|sample| width.amplitude(sample))
        .fold(0.0, f32::max)
}

/// Parse `bytes` as WAV and trim it. Unparseable input is returned as is.
pub fn trim_silence<'a>(bytes: &'a [u8], params: &TrimParams) -> TrimResult<'a> {
    match WavDescriptor::parse(bytes) {
        Ok(descriptor) => trim_with_descriptor(bytes, &descriptor, params),
        Err(err) => {
            tracing::debug!(error = %err, "not trimming: unparseable WAV");
            TrimResult::unchanged(bytes)
        }
    }
}

/// Trim using an already-parsed descriptor of `bytes`.
pub fn trim_with_descriptor<'a>(
    bytes: &'a [u8],
    descriptor: &WavDescriptor,
    params: &TrimParams,
) -> TrimResult<'a> {
    if !descriptor.is_pcm() {
        tracing::debug!(format_tag = descriptor.format_tag, "not trimming: not PCM");
        return TrimResult::unchanged(bytes);
    }
    let Some(width) = SampleWidth::from_bits(descriptor.bits_per_sample) else {
        tracing::debug!(
            bits_per_sample = descriptor.bits_per_sample,
            "not trimming: unsupported bit depth"
        );
        return TrimResult::unchanged(bytes);
    };
    let frame_len = descriptor.frame_len();
    if frame_len == 0 || descriptor.block_align as usize != frame_len {
        tracing::debug!(
            channels = descriptor.channels,
            block_align = descriptor.block_align,
            "not trimming: inconsistent frame layout"
        );
        return TrimResult::unchanged(bytes);
    }

    let data = descriptor.data(bytes);
    let frames = data.len() / frame_len;
    let is_sound = |index: usize| {
        let frame = &data[index * frame_len..(index + 1) * frame_len];
        frame_amplitude(frame, width) >= params.threshold
    };

    let Some(first) = (0..frames).position(is_sound) else {
        tracing::debug!(frames, "not trimming: no frame above threshold");
        return TrimResult::unchanged(bytes);
    };
    // `first` exists, so a last sounding frame does too.
    let last = (0..frames).rposition(is_sound).unwrap_or(first);

    let margin = params.margin_frames(descriptor.sample_rate);
    let start = first.saturating_sub(margin);
    let end = (last + 1).saturating_add(margin).min(frames);
    if start == 0 && end == frames {
        return TrimResult::unchanged(bytes);
    }

    let retained = &data[start * frame_len..end * frame_len];
    match encode_wav(descriptor.fmt_body(bytes), retained) {
        Some(encoded) => {
            tracing::debug!(
                frames_before = frames,
                frames_after = end - start,
                leading = start,
                trailing = frames - end,
                "trimmed silence"
            );
            TrimResult {
                audio: Cow::Owned(encoded),
                trimmed: true,
            }
        }
        None => TrimResult::unchanged(bytes),
    }
}

/// Owned variant for callers that hold the upload by value: returns the
/// original vector untouched when nothing was trimmed.
pub fn trim_owned(audio: Vec<u8>, params: &TrimParams) -> (Vec<u8>, bool) {
    let replacement = match trim_silence(&audio, params).audio {
        Cow::Owned(encoded) => Some(encoded),
        Cow::Borrowed(_) => None,
    };
    match replacement {
        Some(encoded) => (encoded, true),
        None => (audio, false),
    }
}

/// Canonical RIFF/WAVE with the given `fmt ` body and sample data.
/// `None` if a size does not fit the 32-bit RIFF fields.
fn encode_wav(fmt_body: &[u8], samples: &[u8]) -> Option<Vec<u8>> {
    let fmt_padded = fmt_body.len() + (fmt_body.len() & 1);
    let data_padded = samples.len() + (samples.len() & 1);
    let riff_len = 4 + 8 + fmt_padded + 8 + data_padded;

    let riff_size = u32::try_from(riff_len).ok()?;
    let fmt_size = u32::try_from(fmt_body.len()).ok()?;
    let data_size = u32::try_from(samples.len()).ok()?;

    let mut buf = Vec::with_capacity(8 + riff_len);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&riff_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&fmt_size.to_le_bytes());
    buf.extend_from_slice(fmt_body);
    if fmt_body.len() % 2 == 1 {
        buf.push(0);
    }

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    buf.extend_from_slice(samples);
    if samples.len() % 2 == 1 {
        buf.push(0);
    }

    Some(buf)
}
