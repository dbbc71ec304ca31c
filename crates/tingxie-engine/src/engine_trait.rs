use async_trait::async_trait;
use tingxie_core::{TranscriptionError, TranscriptionRequest, TranscriptionResult};

/// A speech-to-text backend.
///
/// Engines are created through [`EngineRegistry`](crate::EngineRegistry),
/// configured once with their `[engine.<name>]` TOML table and then shared
/// read-only between requests.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Registry name of the engine (e.g. `"openai"`, `"null"`).
    fn name(&self) -> &str;
    /// One-time initialisation with engine-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranscriptionError>;
    /// Transcribe one complete audio file.
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError>;
}
