pub mod riff;
pub mod trim;
pub mod wav;

pub use riff::{is_wav, Chunk, Chunks};
pub use trim::{
    trim_owned, trim_silence, trim_with_descriptor, TrimParams, TrimResult, SILENCE_THRESHOLD,
};
pub use wav::{WavDescriptor, WAVE_FORMAT_EXTENSIBLE, WAVE_FORMAT_PCM};
