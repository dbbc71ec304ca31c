use crate::engine_trait::TranscriptionEngine;
use std::collections::HashMap;
use tingxie_core::TranscriptionError;

pub struct EngineRegistry {
    factories: HashMap<String, fn() -> Box<dyn TranscriptionEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("null", || Box::new(crate::null_engine::NullEngine::new()));
        registry.register("openai", || {
            Box::new(crate::openai_engine::OpenAiEngine::new())
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn TranscriptionEngine>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn TranscriptionEngine>, TranscriptionError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| TranscriptionError::EngineNotFound(name.to_string()))
    }

    /// Create the named engine and initialize it with `config`.
    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn TranscriptionEngine>, TranscriptionError> {
        let mut engine = self.create(name)?;
        engine.initialize(config).await?;
        tracing::info!(engine = %name, "transcription engine ready");
        Ok(engine)
    }

    pub fn list_engines(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullEngine;

    #[test]
    fn test_registry_new_has_builtin_engines() {
        let registry = EngineRegistry::new();
        assert!(registry.create("null").is_ok());
        assert!(registry.create("openai").is_ok());
    }

    #[test]
    fn test_registry_create_returns_correct_name() {
        let registry = EngineRegistry::new();
        assert_eq!(registry.create("null").unwrap().name(), "null");
        assert_eq!(registry.create("openai").unwrap().name(), "openai");
    }

    #[test]
    fn test_registry_create_unknown_returns_error() {
        let registry = EngineRegistry::new();
        match registry.create("nope") {
            Err(TranscriptionError::EngineNotFound(name)) => assert_eq!(name, "nope"),
            _ => panic!("expected EngineNotFound error"),
        }
    }

    #[test]
    fn test_registry_register_custom_engine() {
        let mut registry = EngineRegistry::new();
        registry.register("custom", || Box::new(NullEngine::new()));
        let engine = registry.create("custom").unwrap();
        // NullEngine is used as the factory, so name is still "null"
        assert_eq!(engine.name(), "null");
    }

    #[test]
    fn test_registry_list_engines_sorted() {
        let registry = EngineRegistry::new();
        assert_eq!(registry.list_engines(), vec!["null", "openai"]);
    }

    #[tokio::test]
    async fn test_registry_build_initializes_engine() {
        let registry = EngineRegistry::new();
        let mut table = toml::map::Map::new();
        table.insert("text".to_string(), toml::Value::String("你好".to_string()));
        let engine = registry
            .build("null", toml::Value::Table(table))
            .await
            .unwrap();
        assert_eq!(engine.name(), "null");
    }

    #[tokio::test]
    async fn test_registry_build_propagates_init_failure() {
        let registry = EngineRegistry::new();
        let mut table = toml::map::Map::new();
        table.insert("model".to_string(), toml::Value::Integer(5));
        let result = registry.build("openai", toml::Value::Table(table)).await;
        assert!(matches!(
            result,
            Err(TranscriptionError::InitializationFailed(_))
        ));
    }
}
