//! Video Summarizer
//!
//! Fetches video transcripts from a rotating set of third-party providers and
//! summarizes them with an LLM, served over HTTP.

pub mod api;
pub mod config;
pub mod keep_alive;
pub mod llm;
pub mod rapidapi;
pub mod transcript;
pub mod video_id;
pub mod video_info;

// Re-export main types for easy access
pub use crate::api::{build_router, ApiServer, AppState};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::keep_alive::{KeepAlive, KeepAliveHandle};
pub use crate::llm::{LLMConfig, SummaryError, SummaryGenerator};
pub use crate::transcript::{FetchError, ProviderKind, RoundRobinDispatcher, TranscriptProvider};
pub use crate::video_id::{extract_video_id, VideoId};
