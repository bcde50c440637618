//! Local stand-in for the third-party transcript, video info and LLM services

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use video_summarizer::{Config, ConfigBuilder, ProviderKind};

pub const RAPIDAPI_KEY: &str = "fixture-key";

#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn record(&self, name: &str) {
        self.hits.lock().unwrap().push(name.to_string());
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Only the transcript provider hits, in call order
    pub fn transcript_hits(&self) -> Vec<String> {
        self.hits()
            .into_iter()
            .filter(|h| h == "segmented" || h == "flat_text")
            .collect()
    }
}

pub struct FixtureServer {
    pub base_url: String,
    pub recorder: Recorder,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let recorder = Recorder::default();
        let app = Router::new()
            .route("/youtube/transcript", get(segmented))
            .route("/api/transcript-with-url", get(flat_text))
            .route("/api/transcript/", get(transcripts_api))
            .route("/video/info", get(video_info))
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(recorder.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            recorder,
        }
    }

    /// Service configuration pointing every collaborator at this fixture
    pub fn config(&self, rotation: Vec<ProviderKind>) -> Config {
        ConfigBuilder::new()
            .with_rapidapi_key(RAPIDAPI_KEY)
            .with_llm_api_key("sk-fixture")
            .with_llm_endpoint(format!("{}/v1/chat/completions", self.base_url))
            .with_provider_base_url(&self.base_url)
            .with_rotation(rotation)
            .with_testing_delay_ms(0)
            .build()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok()) == Some(RAPIDAPI_KEY)
        && headers.contains_key("x-rapidapi-host")
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "invalid key").into_response()
}

async fn segmented(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorder.record("segmented");
    if !authorized(&headers) {
        return forbidden();
    }

    match params.get("videoId").map(String::as_str) {
        Some("brokenVideo") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "provider exploded").into_response()
        }
        Some("emptyVideo") => Json(json!({ "message": "no captions" })).into_response(),
        Some(_) => Json(json!({
            "content": [
                { "text": "hello", "offset": 0 },
                { "text": "world", "offset": 1500 }
            ]
        }))
        .into_response(),
        None => (StatusCode::BAD_REQUEST, "videoId required").into_response(),
    }
}

async fn flat_text(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorder.record("flat_text");
    if !authorized(&headers) {
        return forbidden();
    }

    let url = params.get("url").cloned().unwrap_or_default();
    if url.contains("missing") {
        return (StatusCode::NOT_FOUND, "transcript not available").into_response();
    }
    if url.contains("noTranscript") {
        return Json(json!({ "success": false })).into_response();
    }
    if url.contains("segmentedTranscript") {
        return Json(json!({ "transcript": [{ "text": "hello", "offset": 0 }] })).into_response();
    }

    Json(json!({
        "success": true,
        "transcript": "flat transcript text",
        "url": url,
        "lang": params.get("lang"),
        "flat_text": params.get("flat_text"),
    }))
    .into_response()
}

async fn transcripts_api(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorder.record("transcripts_api");
    if !authorized(&headers) {
        return forbidden();
    }

    if params.get("video_id").map(String::as_str) == Some("nope") {
        return (StatusCode::NOT_FOUND, "unknown video").into_response();
    }

    Json(json!({
        "content": [
            { "text": "[intro]" },
            { "text": "line one" },
            { "text": "'line two'" },
            { "text": "outro a" },
            { "text": "outro b" }
        ]
    }))
    .into_response()
}

async fn video_info(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    recorder.record("video_info");
    if !authorized(&headers) {
        return forbidden();
    }
    Json(json!({ "title": "Fixture Video", "lengthSeconds": "212" })).into_response()
}

async fn chat_completions(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorder.record("llm");
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-fixture") {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }

    let prompt = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();

    Json(json!({
        "choices": [
            { "message": { "role": "assistant", "content": format!("SUMMARY OF: {}", prompt) } }
        ],
        "usage": { "total_tokens": 99 }
    }))
    .into_response()
}
