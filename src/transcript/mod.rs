//! Transcript retrieval from interchangeable third-party providers
//!
//! Every provider implements [`TranscriptProvider`]; the [`RoundRobinDispatcher`]
//! rotates requests across the registered providers.

pub mod dispatcher;
pub mod providers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::rapidapi::RapidApiClient;
use crate::video_id::VideoId;

pub use dispatcher::{DispatcherError, RoundRobinDispatcher};
pub use providers::{FlatTextTranscriptProvider, SegmentedTranscriptProvider};

/// Failure produced while fetching a transcript (or other provider data)
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("video identifier is empty")]
    EmptyIdentifier,

    #[error("provider unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("provider returned {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// The closed set of transcript provider variants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Returns discrete text segments which are joined into one transcript
    Segmented,
    /// Returns the transcript as a single flat text blob
    FlatText,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Segmented => f.write_str("segmented"),
            ProviderKind::FlatText => f.write_str("flat_text"),
        }
    }
}

/// Capability shared by all transcript providers
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch(&self, video_id: &VideoId) -> Result<String, FetchError>;
    fn kind(&self) -> ProviderKind;
}

/// Instantiate the providers named in `config.rotation`, in that order
pub fn build_providers(
    config: &ProviderConfig,
    client: &RapidApiClient,
) -> Vec<Arc<dyn TranscriptProvider>> {
    config
        .rotation
        .iter()
        .map(|kind| -> Arc<dyn TranscriptProvider> {
            match kind {
                ProviderKind::Segmented => Arc::new(SegmentedTranscriptProvider::new(
                    client.clone(),
                    config.segmented.clone(),
                    config.chunk_size,
                )),
                ProviderKind::FlatText => Arc::new(FlatTextTranscriptProvider::new(
                    client.clone(),
                    config.flat_text.clone(),
                    config.language.clone(),
                )),
            }
        })
        .collect()
}
