//! API module for the video summarizer
//!
//! Exposes the summarize, transcript and liveness endpoints over HTTP.

use anyhow::Result;
use std::future::Future;
use tracing::info;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, AppState};

/// API Server for handling REST requests
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Run the API server until `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        info!("Starting API server on port {}", self.state.config.server.port);
        server::start_http_server(self.state, shutdown).await
    }
}
