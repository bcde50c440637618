//! HTTP server implementation for the API

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::models::{
    upstream_status, ApiError, SummarizeRequest, TranscriptPassthroughRequest, TranscriptsApiQuery,
};
use crate::config::Config;
use crate::llm::SummaryGenerator;
use crate::rapidapi::RapidApiClient;
use crate::transcript::{build_providers, FetchError, RoundRobinDispatcher};
use crate::video_id::VideoId;
use crate::video_info::VideoInfoClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RoundRobinDispatcher>,
    pub summarizer: Arc<SummaryGenerator>,
    pub video_info: Arc<VideoInfoClient>,
    pub rapidapi: RapidApiClient,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up every collaborator from configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let providers = &config.providers;
        let rapidapi = RapidApiClient::new(
            providers.rapidapi_key.clone().unwrap_or_default(),
            providers.timeout_seconds,
        )?;

        let dispatcher = RoundRobinDispatcher::new(build_providers(providers, &rapidapi))?;
        let video_info = VideoInfoClient::new(rapidapi.clone(), providers.video_info.clone());
        let summarizer =
            SummaryGenerator::from_config(&config.llm).context("creating summary generator")?;

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            summarizer: Arc::new(summarizer),
            video_info: Arc::new(video_info),
            rapidapi,
            config: Arc::new(config),
        })
    }
}

/// Build the application router
pub fn build_router(app_state: AppState) -> Router {
    // The service is called straight from browsers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/summarize", post(summarize_handler))
        .route("/testing", post(testing_handler))
        .route("/Youtube_Transcript", post(transcript_passthrough_handler))
        .route("/Youtube_Transcripts_API", get(transcripts_api_handler))
        .route("/version", get(version_handler))
        .route("/ping", get(ping_handler))
        .route("/", get(home_handler))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server, stopping once `shutdown` resolves
pub async fn start_http_server(
    app_state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("{}:{}", app_state.config.server.host, app_state.config.server.port);
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}

/// Summarize handler
async fn summarize_handler(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let response = handlers::summarize(&state, request.url.as_deref()).await?;
    Ok(Json(response))
}

/// Canned summary handler
async fn testing_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(handlers::testing_summary(&state).await)
}

/// Raw transcript passthrough handler
async fn transcript_passthrough_handler(
    State(state): State<AppState>,
    payload: Result<Json<TranscriptPassthroughRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => return ApiError::InvalidBody(e.body_text()).into_response(),
    };

    if request.url.as_deref().map_or(true, str::is_empty) {
        return ApiError::MissingUrl.into_response();
    }

    match handlers::transcript_passthrough(&state, &request).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(FetchError::UpstreamError { status, body }) => (
            upstream_status(status),
            Json(serde_json::json!({
                "error": "Failed to fetch transcript.",
                "details": body
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "An error occurred.",
                "details": e.to_string()
            })),
        )
            .into_response(),
    }
}

/// Joined transcript text handler
async fn transcripts_api_handler(
    State(state): State<AppState>,
    Query(query): Query<TranscriptsApiQuery>,
) -> Response {
    let video_id = VideoId::new(query.video_id);

    match handlers::transcripts_api_text(&state, &video_id, &query.language).await {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            let status = match &e {
                FetchError::UpstreamError { status, .. } => upstream_status(*status),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(serde_json::json!({
                    "error": "Failed to fetch transcript",
                    "status_code": status.as_u16()
                })),
            )
                .into_response()
        }
    }
}

/// Version handler
async fn version_handler() -> impl IntoResponse {
    Json(handlers::version_info())
}

/// Liveness handler hit by the keep-alive scheduler
async fn ping_handler() -> impl IntoResponse {
    info!("Pong! Server is alive!");
    (StatusCode::OK, "Pong! Server is alive!")
}

async fn home_handler() -> impl IntoResponse {
    "Video summarizer is running!"
}
