//! Transcript summarization on top of an [`LLM`] provider

use tracing::{debug, info};

use super::{create_llm, ChatMessage, LLMConfig, SummaryError, LLM};

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Produces a two-part summary (takeaways, then chronology) of a video transcript
pub struct SummaryGenerator {
    llm: Box<dyn LLM>,
}

impl SummaryGenerator {
    pub fn new(llm: Box<dyn LLM>) -> Self {
        Self { llm }
    }

    pub fn from_config(config: &LLMConfig) -> Result<Self, SummaryError> {
        Ok(Self::new(create_llm(config)?))
    }

    pub async fn summarize(&self, title: &str, transcript: &str) -> Result<String, SummaryError> {
        debug!(
            "Requesting summary for \"{}\" ({} transcript chars) from {:?}",
            title,
            transcript.len(),
            self.llm.provider_type()
        );

        let response = self.llm.chat(build_messages(title, transcript)).await?;

        if let Some(tokens) = response.tokens_used {
            info!("Summary for \"{}\" generated using {} tokens", title, tokens);
        }
        Ok(response.content)
    }
}

impl std::fmt::Debug for SummaryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryGenerator")
            .field("provider", &self.llm.provider_type())
            .finish()
    }
}

fn build_messages(title: &str, transcript: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "You are a helpful assistant. Summarize the following video transcript in two parts:\n\
         1. At the top, write a summary that identifies the main takeaways of the video.\n\
         2. Provide a chronological summary of the video, highlighting key points as they happen.\n\
         \n\
         The title of the video is \"{}\". Here is the transcript: {}",
        title, transcript
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}
