use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{FetchError, ProviderKind, TranscriptProvider};
use crate::rapidapi::{RapidApiClient, RapidApiEndpoint};
use crate::video_id::VideoId;

/// A single timed line of a segmented transcript
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
}

/// Response body of the segmented transcript service
#[derive(Debug, Deserialize)]
pub struct SegmentedTranscriptResponse {
    pub content: Option<Vec<TranscriptSegment>>,
}

/// Provider that receives discrete segments and joins them with spaces
pub struct SegmentedTranscriptProvider {
    client: RapidApiClient,
    endpoint: RapidApiEndpoint,
    chunk_size: u32,
}

impl SegmentedTranscriptProvider {
    pub fn new(client: RapidApiClient, endpoint: RapidApiEndpoint, chunk_size: u32) -> Self {
        Self {
            client,
            endpoint,
            chunk_size,
        }
    }
}

#[async_trait]
impl TranscriptProvider for SegmentedTranscriptProvider {
    async fn fetch(&self, video_id: &VideoId) -> Result<String, FetchError> {
        let chunk_size = self.chunk_size.to_string();
        let request = self.client.get(
            &self.endpoint,
            "/youtube/transcript",
            &[("videoId", video_id.as_str()), ("chunkSize", chunk_size.as_str())],
        );

        let response: SegmentedTranscriptResponse = self.client.send_json(request).await?;
        let segments = response
            .content
            .ok_or_else(|| FetchError::MalformedResponse("missing `content` field".to_string()))?;

        debug!("Received {} transcript segments for {}", segments.len(), video_id);

        let transcript = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        info!("Received transcript for {} from {}", video_id, self.kind());
        Ok(transcript)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Segmented
    }
}

/// Response body of the flat-text transcript service
#[derive(Debug, Deserialize)]
struct FlatTextTranscriptResponse {
    transcript: Option<serde_json::Value>,
}

/// Provider that receives the transcript as one text blob and forwards it
pub struct FlatTextTranscriptProvider {
    client: RapidApiClient,
    endpoint: RapidApiEndpoint,
    language: String,
}

impl FlatTextTranscriptProvider {
    pub fn new(client: RapidApiClient, endpoint: RapidApiEndpoint, language: String) -> Self {
        Self {
            client,
            endpoint,
            language,
        }
    }
}

#[async_trait]
impl TranscriptProvider for FlatTextTranscriptProvider {
    async fn fetch(&self, video_id: &VideoId) -> Result<String, FetchError> {
        let watch_url = video_id.watch_url();
        let request = self.client.get(
            &self.endpoint,
            "/api/transcript-with-url",
            &[
                ("url", watch_url.as_str()),
                ("flat_text", "true"),
                ("lang", self.language.as_str()),
            ],
        );

        let response: FlatTextTranscriptResponse = self.client.send_json(request).await?;
        match response.transcript {
            Some(serde_json::Value::String(text)) => {
                info!("Received transcript for {} from {}", video_id, self.kind());
                Ok(text)
            }
            Some(_) => Err(FetchError::MalformedResponse(
                "`transcript` field is not flat text".to_string(),
            )),
            None => Err(FetchError::MalformedResponse(
                "missing `transcript` field".to_string(),
            )),
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::FlatText
    }
}
