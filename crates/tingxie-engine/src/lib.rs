pub mod engine_trait;
pub mod null_engine;
pub mod openai_engine;
pub mod registry;

pub use engine_trait::TranscriptionEngine;
pub use null_engine::NullEngine;
pub use openai_engine::OpenAiEngine;
pub use registry::EngineRegistry;
