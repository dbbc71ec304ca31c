use std::sync::Arc;
use tingxie_audio::TrimParams;
use tingxie_core::AppConfig;
use tingxie_engine::TranscriptionEngine;

/// Shared, read-only request context.
pub struct AppState {
    engine: Arc<dyn TranscriptionEngine>,
    default_api_key: Option<String>,
    /// `None` disables trimming.
    trim: Option<TrimParams>,
}

impl AppState {
    pub fn new(engine: Arc<dyn TranscriptionEngine>) -> Self {
        Self {
            engine,
            default_api_key: None,
            trim: Some(TrimParams::default()),
        }
    }

    /// Build from loaded config. The default API key is resolved here, once.
    pub fn from_config(config: &AppConfig, engine: Arc<dyn TranscriptionEngine>) -> Self {
        let trim = config
            .trim
            .enabled
            .then(|| TrimParams::with_margin_ms(config.trim.margin_ms));
        Self::new(engine)
            .with_default_api_key(config.engine.resolve_api_key())
            .with_trim(trim)
    }

    pub fn with_default_api_key(mut self, key: Option<String>) -> Self {
        self.default_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_trim(mut self, trim: Option<TrimParams>) -> Self {
        self.trim = trim;
        self
    }

    pub fn engine(&self) -> &dyn TranscriptionEngine {
        self.engine.as_ref()
    }

    pub fn trim_params(&self) -> Option<TrimParams> {
        self.trim
    }

    pub fn has_default_api_key(&self) -> bool {
        self.default_api_key.is_some()
    }

    /// A non-empty per-request key wins over the default.
    pub fn resolve_api_key(&self, override_key: Option<&str>) -> Option<String> {
        override_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .or_else(|| self.default_api_key.clone())
    }
}
