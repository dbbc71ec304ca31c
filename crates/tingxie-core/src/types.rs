use std::fmt;

/// Audio handed to a transcription engine, together with the decoding hints
/// and the credential resolved for this request.
#[derive(Clone)]
pub struct TranscriptionRequest {
    pub audio: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
    pub language: String,
    pub temperature: f32,
    pub api_key: String,
}

impl fmt::Debug for TranscriptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionRequest")
            .field("audio_bytes", &self.audio.len())
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("language", &self.language)
            .field("temperature", &self.temperature)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: Option<String>,
    pub confidence: Option<f32>,
}
