use crate::engine_trait::TranscriptionEngine;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tingxie_core::{TranscriptionError, TranscriptionRequest, TranscriptionResult};

/// Offline engine that answers every request with a fixed text.
pub struct NullEngine {
    text: String,
    call_count: AtomicUsize,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranscriptionError> {
        match config.get("text") {
            None => {}
            Some(toml::Value::String(text)) => self.text = text.clone(),
            Some(other) => {
                return Err(TranscriptionError::InitializationFailed(format!(
                    "'text' must be a string, got {}",
                    other.type_str()
                )))
            }
        }
        Ok(())
    }

    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let count = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(
            "NullEngine call #{count}, {} bytes from {}",
            request.audio.len(),
            request.filename
        );
        Ok(TranscriptionResult {
            text: self.text.clone(),
            language: Some(request.language),
            confidence: None,
        })
    }
}
