//! API request handlers

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use super::models::{ApiError, SummarizeResponse, TranscriptPassthroughRequest};
use super::server::AppState;
use crate::transcript::FetchError;
use crate::video_id::{extract_video_id, VideoId};

/// Resolve the URL to a video, fetch its title and transcript, and summarize it
pub async fn summarize(
    state: &AppState,
    url: Option<&str>,
) -> Result<SummarizeResponse, ApiError> {
    let url = url.filter(|u| !u.trim().is_empty()).ok_or(ApiError::MissingUrl)?;
    info!("Received request for summarize: {}", url);

    let video_id = extract_video_id(url).ok_or_else(|| ApiError::NoMatch(url.to_string()))?;

    // A missing title degrades the prompt but does not fail the request.
    let title = match state.video_info.title(&video_id).await {
        Ok(title) => Some(title),
        Err(e) => {
            warn!("Could not fetch title for {}: {}", video_id, e);
            None
        }
    };

    let transcript = state.dispatcher.fetch_transcript(&video_id).await?;
    info!("Received transcript for {} ({} chars)", video_id, transcript.len());

    let summary = state
        .summarizer
        .summarize(title.as_deref().unwrap_or("Untitled video"), &transcript)
        .await?;
    info!("Returning summary for {}", video_id);

    Ok(SummarizeResponse { title, summary })
}

/// Forward a transcript request to the flat-text provider and return its JSON untouched
pub async fn transcript_passthrough(
    state: &AppState,
    request: &TranscriptPassthroughRequest,
) -> Result<Value, FetchError> {
    let url = request.url.as_deref().unwrap_or_default();
    let flat_text = request.flat_text_param();
    let providers = &state.config.providers;

    let builder = state.rapidapi.get(
        &providers.flat_text,
        "/api/transcript-with-url",
        &[("url", url), ("flat_text", flat_text.as_str()), ("lang", request.lang_param())],
    );

    state.rapidapi.send_json(builder).await
}

#[derive(Debug, Deserialize)]
struct TranscriptsApiResponse {
    #[serde(default)]
    content: Vec<TranscriptsApiLine>,
}

#[derive(Debug, Deserialize)]
struct TranscriptsApiLine {
    text: String,
}

/// Fetch a transcript from the transcripts API and return it as joined, trimmed text
pub async fn transcripts_api_text(
    state: &AppState,
    video_id: &VideoId,
    language: &str,
) -> Result<String, FetchError> {
    let builder = state.rapidapi.get(
        &state.config.providers.transcripts_api,
        "/api/transcript/",
        &[("video_id", video_id.as_str()), ("language", language)],
    );

    let response: TranscriptsApiResponse = state.rapidapi.send_json(builder).await?;
    let lines = response.content.into_iter().map(|l| l.text).collect();
    Ok(trim_transcript_lines(lines))
}

/// Drop the service's framing lines and join the rest.
///
/// The first line and the last two are boilerplate when there are more than
/// two lines; the final remaining line is wrapped in one quote character on
/// each side.
pub fn trim_transcript_lines(mut lines: Vec<String>) -> String {
    if lines.len() > 2 {
        lines.truncate(lines.len() - 2);
        lines.remove(0);
    }

    if let Some(last) = lines.last_mut() {
        let mut chars = last.chars();
        chars.next();
        chars.next_back();
        *last = chars.as_str().to_string();
    }

    lines.join(" ")
}

/// Canned summary used by front-end developers
pub async fn testing_summary(state: &AppState) -> SummarizeResponse {
    tokio::time::sleep(Duration::from_millis(state.config.testing.delay_ms)).await;

    SummarizeResponse {
        title: Some("How to run fast".to_string()),
        summary: "### Main takeaways\n\
            - **Posture** matters more than stride length.\n\
            - Short, quick ground contact keeps momentum.\n\n\
            ### Chronological summary\n\
            1. The host demonstrates a relaxed forward lean.\n\
            2. Drills for arm swing and cadence follow.\n\
            3. The video closes with a weekly training plan."
            .to_string(),
    }
}

/// Service and dependency version information
pub fn version_info() -> Value {
    serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "rust_version": option_env!("CARGO_PKG_RUST_VERSION").unwrap_or("unknown"),
        "dependencies": {
            "axum": "0.7",
            "reqwest": "0.12",
            "tokio": "1",
            "tower-http": "0.5",
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}
