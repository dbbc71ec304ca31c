use crate::types::{error_codes, ErrorResponse};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tingxie_core::TranscriptionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing 'audio' file part")]
    MissingAudio,

    #[error("uploaded file is empty")]
    EmptyAudio,

    #[error("missing API key: pass form field 'api_key' or configure a default key")]
    MissingApiKey,

    #[error("invalid form field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingAudio
            | ApiError::EmptyAudio
            | ApiError::MissingApiKey
            | ApiError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Transcription(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingAudio => error_codes::MISSING_AUDIO,
            ApiError::EmptyAudio => error_codes::EMPTY_AUDIO,
            ApiError::MissingApiKey => error_codes::MISSING_API_KEY,
            ApiError::InvalidField { .. } => error_codes::INVALID_FIELD,
            ApiError::Multipart { .. } => error_codes::INVALID_MULTIPART,
            ApiError::Transcription(_) => error_codes::TRANSCRIPTION_FAILED,
            ApiError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<axum::extract::multipart::MultipartRejection> for ApiError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        ApiError::Multipart {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
