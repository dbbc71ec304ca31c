//! OpenAI-compatible `/v1/audio/transcriptions` client.

use crate::engine_trait::TranscriptionEngine;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tingxie_core::{TranscriptionError, TranscriptionRequest, TranscriptionResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "whisper-1";
const ENDPOINT_PATH: &str = "/v1/audio/transcriptions";

pub struct OpenAiEngine {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Option<Duration>,
}

impl OpenAiEngine {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ENDPOINT_PATH)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for OpenAiEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn string_setting(config: &toml::Value, key: &str) -> Result<Option<String>, TranscriptionError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Some(other) => Err(TranscriptionError::InitializationFailed(format!(
            "'{key}' must be a non-empty string, got {}",
            other.type_str()
        ))),
    }
}

/// Pull a human-readable message out of an OpenAI error body, falling back
/// to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// File part for the upload. The client's content type is forwarded when it
/// is a valid header value.
fn audio_part(
    audio: Vec<u8>,
    filename: String,
    content_type: Option<&str>,
) -> reqwest::multipart::Part {
    let part = reqwest::multipart::Part::bytes(audio).file_name(filename);
    let Some(content_type) = content_type else {
        return part;
    };
    match HeaderValue::from_str(content_type) {
        Ok(value) => {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, value);
            part.headers(headers)
        }
        Err(_) => {
            tracing::debug!(content_type, "not forwarding invalid content type");
            part
        }
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiEngine {
    fn name(&self) -> &str {
        "openai"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranscriptionError> {
        if let Some(base_url) = string_setting(&config, "base_url")? {
            self.base_url = base_url;
        }
        if let Some(model) = string_setting(&config, "model")? {
            self.model = model;
        }
        self.timeout = match config.get("timeout_secs") {
            None => None,
            Some(toml::Value::Integer(secs)) if *secs > 0 => Some(Duration::from_secs(*secs as u64)),
            Some(other) => {
                return Err(TranscriptionError::InitializationFailed(format!(
                    "'timeout_secs' must be a positive integer, got {other}"
                )))
            }
        };

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        self.http_client = builder.build().map_err(|e| {
            TranscriptionError::InitializationFailed(format!("failed to create HTTP client: {e}"))
        })?;

        tracing::info!(
            endpoint = %self.endpoint(),
            model = %self.model,
            timeout = ?self.timeout,
            "OpenAiEngine initialized"
        );
        Ok(())
    }

    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let endpoint = self.endpoint();
        let audio_len = request.audio.len();
        let part = audio_part(request.audio, request.filename, request.content_type.as_deref());
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("temperature", request.temperature.to_string());
        if !request.language.is_empty() {
            form = form.text("language", request.language);
        }

        tracing::debug!(%endpoint, audio_len, "sending transcription request");
        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&request.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::Request(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(TranscriptionError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;
        let text = json
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TranscriptionError::InvalidResponse("missing 'text' field".to_string()))?
            .to_string();

        Ok(TranscriptionResult {
            text,
            language: json.get("language").and_then(|v| v.as_str()).map(String::from),
            confidence: None,
        })
    }
}
