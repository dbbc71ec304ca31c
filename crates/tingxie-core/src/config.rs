use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub trim: TrimConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrimConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Context kept on each side of the detected speech, in milliseconds.
    #[serde(default)]
    pub margin_ms: u32,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            margin_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_engine_name")]
    pub name: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-engine tables, e.g. `[engine.openai]`.
    #[serde(flatten)]
    pub settings: toml::Table,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            api_key: None,
            api_key_env: default_api_key_env(),
            settings: toml::Table::new(),
        }
    }
}

impl EngineConfig {
    /// Settings table for the named engine, empty when the section is absent.
    pub fn settings_for(&self, name: &str) -> toml::Value {
        self.settings
            .get(name)
            .cloned()
            .unwrap_or_else(|| toml::Value::Table(Default::default()))
    }

    /// Default API key: the `api_key` field if non-empty, else the variable
    /// named by `api_key_env`. Called once at startup.
    pub fn resolve_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone())
            .or_else(|| non_empty(std::env::var(&self.api_key_env).ok()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_engine_name() -> String {
    "openai".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"))
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in env_var_pattern().captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.name.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.name must not be empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_valid_toml() {
        let toml_str = r#"
[general]
log_level = "debug"

[server]
host = "127.0.0.1"
port = 9000
max_upload_bytes = 1048576

[trim]
enabled = false
margin_ms = 100

[engine]
name = "openai"
api_key = "sk-test"

[engine.openai]
base_url = "http://localhost:1234"
model = "whisper-1"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.server.max_upload_bytes, 1_048_576);
        assert!(!config.trim.enabled);
        assert_eq!(config.trim.margin_ms, 100);
        assert_eq!(config.engine.name, "openai");
        assert_eq!(config.engine.api_key.as_deref(), Some("sk-test"));
        let openai = config.engine.settings_for("openai");
        assert_eq!(
            openai.get("base_url").and_then(|v| v.as_str()),
            Some("http://localhost:1234")
        );
    }

    #[test]
    fn test_config_default_values() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert!(config.trim.enabled);
        assert_eq!(config.trim.margin_ms, 0);
        assert_eq!(config.engine.name, "openai");
        assert_eq!(config.engine.api_key_env, "OPENAI_API_KEY");
        assert!(config.engine.api_key.is_none());
    }

    #[test]
    fn test_config_missing_engine_section_gives_empty_settings() {
        let config = AppConfig::from_toml_str("[engine]\nname = \"null\"\n").unwrap();
        let settings = config.engine.settings_for("null");
        assert!(settings.as_table().unwrap().is_empty());
    }

    #[test]
    fn test_config_env_var_interpolation() {
        std::env::set_var("TINGXIE_TEST_MODEL", "whisper-large");
        let toml_str = r#"
[engine.openai]
model = "${TINGXIE_TEST_MODEL}"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        let model = config.engine.settings_for("openai");
        assert_eq!(model.get("model").and_then(|v| v.as_str()), Some("whisper-large"));
        std::env::remove_var("TINGXIE_TEST_MODEL");
    }

    #[test]
    fn test_config_missing_env_var_error() {
        let toml_str = r#"
[engine]
api_key = "${DEFINITELY_DOES_NOT_EXIST_12345}"
"#;
        let err = AppConfig::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("DEFINITELY_DOES_NOT_EXIST_12345"));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let result = AppConfig::from_toml_str("this is not valid toml [[[");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_config_rejects_zero_upload_limit() {
        let result = AppConfig::from_toml_str("[server]\nmax_upload_bytes = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_resolve_api_key_prefers_config_value() {
        std::env::set_var("TINGXIE_TEST_KEY_A", "from-env");
        let config = AppConfig::from_toml_str(
            "[engine]\napi_key = \"from-file\"\napi_key_env = \"TINGXIE_TEST_KEY_A\"\n",
        )
        .unwrap();
        assert_eq!(config.engine.resolve_api_key().as_deref(), Some("from-file"));
        std::env::remove_var("TINGXIE_TEST_KEY_A");
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_env() {
        std::env::set_var("TINGXIE_TEST_KEY_B", "from-env");
        let config = AppConfig::from_toml_str(
            "[engine]\napi_key = \"  \"\napi_key_env = \"TINGXIE_TEST_KEY_B\"\n",
        )
        .unwrap();
        assert_eq!(config.engine.resolve_api_key().as_deref(), Some("from-env"));
        std::env::remove_var("TINGXIE_TEST_KEY_B");
    }

    #[test]
    fn test_resolve_api_key_none_when_unset() {
        let config = AppConfig::from_toml_str(
            "[engine]\napi_key_env = \"TINGXIE_TEST_KEY_NEVER_SET_987\"\n",
        )
        .unwrap();
        assert!(config.engine.resolve_api_key().is_none());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = std::env::temp_dir().join("tingxie_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");
        std::fs::write(
            &path,
            r#"
[general]
log_level = "warn"

[server]
port = 8123
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.server.port, 8123);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_load_from_file_not_found() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path.toml"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to read config file"));
    }
}
