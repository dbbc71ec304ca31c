use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reasons a buffer could not be parsed as RIFF/WAVE.
///
/// None of these reach an HTTP caller; the trimmer treats every variant as
/// "leave the audio alone".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    #[error("missing RIFF magic")]
    NotRiff,

    #[error("missing WAVE form type")]
    NotWave,

    #[error("missing 'fmt ' sub-chunk")]
    MissingFmt,

    #[error("missing 'data' sub-chunk")]
    MissingData,

    #[error("'fmt ' sub-chunk too short: {0} bytes")]
    FmtTooShort(usize),
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("engine not found: {0}")]
    EngineNotFound(String),

    #[error("transcription request failed: {0}")]
    Request(String),

    #[error("transcription API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid transcription response: {0}")]
    InvalidResponse(String),
}
