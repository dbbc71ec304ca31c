use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscribeResponse {
    /// Transcribed Hanzi, whitespace-trimmed.
    pub text: String,
    /// Space-separated pinyin with trailing tone digits.
    pub pinyin: String,
    /// Filename of the uploaded part, if the client sent one.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Whether leading/trailing silence was removed before transcription.
    pub trimmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub mod error_codes {
    pub const MISSING_AUDIO: &str = "MISSING_AUDIO";
    pub const EMPTY_AUDIO: &str = "EMPTY_AUDIO";
    pub const MISSING_API_KEY: &str = "MISSING_API_KEY";
    pub const INVALID_FIELD: &str = "INVALID_FIELD";
    pub const INVALID_MULTIPART: &str = "INVALID_MULTIPART";
    pub const TRANSCRIPTION_FAILED: &str = "TRANSCRIPTION_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
