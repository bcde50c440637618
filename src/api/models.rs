//! API data models

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::SummaryError;
use crate::transcript::FetchError;

/// Body of `POST /summarize`
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub url: Option<String>,
}

/// Successful `POST /summarize` response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SummarizeResponse {
    pub title: Option<String>,
    pub summary: String,
}

/// Body of `POST /Youtube_Transcript`
#[derive(Debug, Deserialize)]
pub struct TranscriptPassthroughRequest {
    pub url: Option<String>,
    /// Accepts either a JSON boolean or a string
    pub flat_text: Option<serde_json::Value>,
    pub lang: Option<String>,
}

impl TranscriptPassthroughRequest {
    pub fn flat_text_param(&self) -> String {
        match &self.flat_text {
            None | Some(serde_json::Value::Null) => "true".to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn lang_param(&self) -> &str {
        self.lang.as_deref().unwrap_or("en")
    }
}

/// Query of `GET /Youtube_Transcripts_API`
#[derive(Debug, Deserialize)]
pub struct TranscriptsApiQuery {
    #[serde(default = "default_video_id")]
    pub video_id: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_video_id() -> String {
    "dQw4w9WgXcQ".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Errors surfaced by the summarize endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("The 'url' field is required.")]
    MissingUrl,

    #[error("Unrecognized video URL: {0}")]
    NoMatch(String),

    #[error("Failed to retrieve transcript: {0}")]
    Transcript(#[from] FetchError),

    #[error("Failed to generate summary: {0}")]
    Summary(#[from] SummaryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::MissingUrl | ApiError::NoMatch(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Transcript(_) | ApiError::Summary(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Map an upstream status onto our response, falling back to 502 for nonsense codes
pub fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
