//! HTTP handlers for `/health` and `/transcribe`.

use crate::error::ApiError;
use crate::romanize;
use crate::state::AppState;
use crate::types::{HealthResponse, TranscribeResponse};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;
use tingxie_audio::TrimParams;
use tingxie_core::TranscriptionRequest;

const DEFAULT_LANGUAGE: &str = "zh";
const DEFAULT_TEMPERATURE: f32 = 0.0;
const FALLBACK_FILENAME: &str = "audio.wav";

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

struct Upload {
    bytes: Vec<u8>,
    filename: Option<String>,
    content_type: Option<String>,
}

#[derive(Default)]
struct TranscribeForm {
    audio: Option<Upload>,
    language: Option<String>,
    temperature: Option<String>,
    api_key: Option<String>,
}

impl TranscribeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };
            match name.as_str() {
                // First audio part wins.
                "audio" if form.audio.is_none() => {
                    let filename = field.file_name().map(String::from);
                    let content_type = field.content_type().map(String::from);
                    let bytes = field.bytes().await?.to_vec();
                    form.audio = Some(Upload {
                        bytes,
                        filename,
                        content_type,
                    });
                }
                "audio" => tracing::debug!("ignoring duplicate audio part"),
                "language" => form.language = Some(field.text().await?),
                "temperature" => form.temperature = Some(field.text().await?),
                "api_key" => form.api_key = Some(field.text().await?),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    fn language(&self) -> String {
        match self.language.as_deref().map(str::trim) {
            Some(lang) if !lang.is_empty() => lang.to_string(),
            _ => DEFAULT_LANGUAGE.to_string(),
        }
    }

    fn temperature(&self) -> Result<f32, ApiError> {
        let raw = match self.temperature.as_deref().map(str::trim) {
            None | Some("") => return Ok(DEFAULT_TEMPERATURE),
            Some(raw) => raw,
        };
        let value: f32 = raw.parse().map_err(|_| ApiError::InvalidField {
            field: "temperature",
            reason: format!("'{raw}' is not a number"),
        })?;
        if !value.is_finite() {
            return Err(ApiError::InvalidField {
                field: "temperature",
                reason: format!("'{raw}' is not finite"),
            });
        }
        Ok(value)
    }
}

/// Trim WAV uploads on the blocking pool; pass anything else through.
async fn prepare_audio(
    bytes: Vec<u8>,
    params: Option<TrimParams>,
) -> Result<(Vec<u8>, bool), ApiError> {
    let Some(params) = params else {
        return Ok((bytes, false));
    };
    if !tingxie_audio::is_wav(&bytes) {
        return Ok((bytes, false));
    }
    tokio::task::spawn_blocking(move || tingxie_audio::trim_owned(bytes, &params))
        .await
        .map_err(|e| ApiError::Internal(format!("trim task failed: {e}")))
}

/// POST /transcribe
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let start_time = Instant::now();
    let form = TranscribeForm::read(multipart?).await?;

    let language = form.language();
    let temperature = form.temperature()?;
    let upload = form.audio.ok_or(ApiError::MissingAudio)?;
    if upload.bytes.is_empty() {
        return Err(ApiError::EmptyAudio);
    }
    let api_key = state
        .resolve_api_key(form.api_key.as_deref())
        .ok_or(ApiError::MissingApiKey)?;

    let original_len = upload.bytes.len();
    let (audio, trimmed) = prepare_audio(upload.bytes, state.trim_params()).await?;

    let request = TranscriptionRequest {
        audio,
        filename: upload
            .filename
            .clone()
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string()),
        content_type: upload.content_type.clone(),
        language,
        temperature,
        api_key,
    };
    let sent_len = request.audio.len();

    let result = state.engine().transcribe(request).await.map_err(|e| {
        tracing::error!(engine = state.engine().name(), error = %e, "transcription failed");
        ApiError::Transcription(e)
    })?;

    let text = result.text.trim().to_string();
    let pinyin = romanize::to_pinyin(&text);

    tracing::info!(
        filename = upload.filename.as_deref().unwrap_or("-"),
        original_len,
        sent_len,
        trimmed,
        chars = text.chars().count(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "transcription complete"
    );

    Ok(Json(TranscribeResponse {
        text,
        pinyin,
        filename: upload.filename,
        content_type: upload.content_type,
        trimmed,
    }))
}
