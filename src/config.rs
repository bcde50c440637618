use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::keep_alive::KeepAliveConfig;
use crate::llm::LLMConfig;
use crate::rapidapi::RapidApiEndpoint;
use crate::transcript::ProviderKind;

/// Configuration for the video summarizer service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Transcript and video info providers
    pub providers: ProviderConfig,

    /// Summary LLM settings
    pub llm: LLMConfig,

    /// Self-ping scheduler
    pub keep_alive: KeepAliveConfig,

    /// Canned `/testing` endpoint
    pub testing: TestingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Key sent as `x-rapidapi-key` to every provider
    pub rapidapi_key: Option<String>,

    /// Transcript providers in round-robin order
    pub rotation: Vec<ProviderKind>,

    pub segmented: RapidApiEndpoint,
    pub flat_text: RapidApiEndpoint,

    /// Service behind `/Youtube_Transcripts_API`
    pub transcripts_api: RapidApiEndpoint,

    /// Title lookup service
    pub video_info: RapidApiEndpoint,

    /// Segment size requested from the segmented provider
    pub chunk_size: u32,

    /// Transcript language requested from the flat-text provider
    pub language: String,

    /// Request timeout in seconds for all provider calls
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rapidapi_key: None,
            rotation: vec![ProviderKind::Segmented, ProviderKind::FlatText],
            segmented: RapidApiEndpoint::new("youtube-transcripts.p.rapidapi.com"),
            flat_text: RapidApiEndpoint::new("youtube-transcript3.p.rapidapi.com"),
            transcripts_api: RapidApiEndpoint::new("youtube-transcripts-api.p.rapidapi.com"),
            video_info: RapidApiEndpoint::new("yt-api.p.rapidapi.com"),
            chunk_size: 500,
            language: "en".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    /// Artificial latency of the canned summary, in milliseconds
    pub delay_ms: u64,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self { delay_ms: 5000 }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = [
            "video-summarizer.toml",
            "config/video-summarizer.toml",
            "/etc/video-summarizer/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {:#}", path, e);
                    }
                }
            }
        }

        Ok(Self::from_env())
    }

    /// Parse a TOML configuration file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override fields from environment variables when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var("RAPIDAPI_KEY") {
            self.providers.rapidapi_key = Some(key);
        }

        if let Some(key) = var("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }

        if let Some(model) = var("OPENAI_MODEL") {
            self.llm.model = model;
        }

        if let Some(port) = var("SUMMARIZER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid SUMMARIZER_PORT: {}", port),
            }
        }

        if let Some(url) = var("KEEP_ALIVE_URL") {
            self.keep_alive.target_url = Some(url).filter(|u| !u.is_empty());
        }

        if let Some(secs) = var("KEEP_ALIVE_INTERVAL_SECS") {
            match secs.parse() {
                Ok(secs) => self.keep_alive.interval_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid KEEP_ALIVE_INTERVAL_SECS: {}", secs),
            }
        }

        self
    }

    /// Validate configuration. Credentials are required up front so that no
    /// request is ever sent to a provider without them.
    pub fn validate(&self) -> Result<()> {
        if self
            .providers
            .rapidapi_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
        {
            return Err(anyhow!("RAPIDAPI_KEY is not set"));
        }

        if self
            .llm
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
        {
            return Err(anyhow!("OPENAI_API_KEY is not set"));
        }

        if self.providers.rotation.is_empty() {
            return Err(anyhow!("providers.rotation must name at least one transcript provider"));
        }

        if self.keep_alive.target_url.is_some() && self.keep_alive.interval_secs == 0 {
            return Err(anyhow!("keep_alive.interval_secs must be greater than 0"));
        }

        tracing::info!("Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        let rotation = self
            .providers
            .rotation
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");

        format!(
            "Video Summarizer Configuration:\n\
            - Listen: {}:{}\n\
            - Transcript rotation: {}\n\
            - LLM model: {}\n\
            - Keep-alive: {}",
            self.server.host,
            self.server.port,
            rotation,
            self.llm.model,
            match &self.keep_alive.target_url {
                Some(url) => format!("{} every {}s", url, self.keep_alive.interval_secs),
                None => "disabled".to_string(),
            }
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_rapidapi_key(mut self, key: impl Into<String>) -> Self {
        self.config.providers.rapidapi_key = Some(key.into());
        self
    }

    pub fn with_llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.llm.api_key = Some(key.into());
        self
    }

    pub fn with_llm_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.llm.endpoint = endpoint.into();
        self
    }

    pub fn with_rotation(mut self, rotation: Vec<ProviderKind>) -> Self {
        self.config.providers.rotation = rotation;
        self
    }

    /// Point every RapidAPI service at the same base URL (used against local fixtures)
    pub fn with_provider_base_url(mut self, base_url: &str) -> Self {
        let providers = &mut self.config.providers;
        for endpoint in [
            &mut providers.segmented,
            &mut providers.flat_text,
            &mut providers.transcripts_api,
            &mut providers.video_info,
        ] {
            endpoint.base_url = base_url.to_string();
        }
        self
    }

    pub fn with_keep_alive(mut self, target_url: impl Into<String>, interval_secs: u64) -> Self {
        self.config.keep_alive.target_url = Some(target_url.into());
        self.config.keep_alive.interval_secs = interval_secs;
        self
    }

    pub fn with_testing_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.testing.delay_ms = delay_ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
