use serde::Deserialize;
use tracing::debug;

use crate::rapidapi::{RapidApiClient, RapidApiEndpoint};
use crate::transcript::FetchError;
use crate::video_id::VideoId;

#[derive(Debug, Deserialize)]
struct VideoInfoResponse {
    title: Option<String>,
}

/// Looks up video metadata (currently only the title)
#[derive(Debug, Clone)]
pub struct VideoInfoClient {
    client: RapidApiClient,
    endpoint: RapidApiEndpoint,
}

impl VideoInfoClient {
    pub fn new(client: RapidApiClient, endpoint: RapidApiEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub async fn title(&self, video_id: &VideoId) -> Result<String, FetchError> {
        let request = self
            .client
            .get(&self.endpoint, "/video/info", &[("id", video_id.as_str())]);

        let info: VideoInfoResponse = self.client.send_json(request).await?;
        let title = info.title.ok_or_else(|| {
            FetchError::MalformedResponse("title not found in video info".to_string())
        })?;

        debug!("Title for {}: {}", video_id, title);
        Ok(title)
    }
}
