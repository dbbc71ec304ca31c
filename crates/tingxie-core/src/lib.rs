pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EngineConfig, GeneralConfig, ServerConfig, TrimConfig};
pub use error::{ConfigError, TranscriptionError, WavError};
pub use types::{TranscriptionRequest, TranscriptionResult};
