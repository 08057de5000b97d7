//! Narration generation
//!
//! Turns a [`PromptDocument`] into a podcast script through a chat-completion
//! provider and guarantees the script ends with the sign-off token.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::NarrationConfig;
use crate::error::PodcastError;
use crate::prompt::PromptDocument;

/// Stop sequence sent to the provider and appended to every script
pub const SIGN_OFF: &str = "goodbye!";

pub const SYSTEM_PROMPT: &str = "You are a tool that generates content for a funny, interesting, and entertaining podcast about the local area.
The podcast has a single host.
Your job is to provide the script *verbatim*, without any additional annotations (no need to write 'Host:' or similar!).
You never produce intros, outros, or filler content.
You occasionally make it clear that the content was AI generated, but do so in a funny and cute way (sound like a self-aware AI).
Users will provide you with some research they have done on the local area, and your job is to synthesise this and summarise this into a 2 to 3 minute script.
You are completely allowed to miss out some bits of the research if you think there won't be enough time to include them as part of a coherent text.
Also, please miss out any controversial news headlines or items that could cause offence.
Finally, make sure to make a few spicy jokes and keep the tone light. The aim is to entertain! Don't sound overly didactic or like a tour guide.";

/// Parameters for a single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: String,
}

/// A language model that completes a system + user prompt pair
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PodcastError>;
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    n: u32,
    temperature: f32,
    stop: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiChatClient {
    pub fn new(client: Client, config: &NarrationConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChatClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PodcastError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            n: 1,
            temperature: request.temperature,
            stop: &request.stop,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PodcastError::completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();
            return Err(PodcastError::completion(format!(
                "provider returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PodcastError::completion(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PodcastError::completion("response contained no message content"))
    }
}

/// Trim the raw completion and make it end with exactly one sign-off
#[must_use]
pub fn finalize_script(raw: &str) -> String {
    let mut body = raw.trim();
    while body.len() >= SIGN_OFF.len()
        && body.is_char_boundary(body.len() - SIGN_OFF.len())
        && body[body.len() - SIGN_OFF.len()..].eq_ignore_ascii_case(SIGN_OFF)
    {
        body = body[..body.len() - SIGN_OFF.len()].trim_end();
    }
    format!("{body} {SIGN_OFF}")
}

/// Sends prompt documents to the completion provider with the host persona
pub struct NarrationGenerator {
    provider: Arc<dyn CompletionProvider>,
    max_tokens: u32,
    temperature: f32,
}

impl NarrationGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &NarrationConfig) -> Self {
        Self {
            provider,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// The completion request sent for `document`
    #[must_use]
    pub fn request_for(&self, document: &PromptDocument) -> CompletionRequest {
        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: document.as_str().to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stop: SIGN_OFF.to_string(),
        }
    }

    /// Generate the narration script for a prompt document
    #[instrument(skip(self, document))]
    pub async fn generate(&self, document: &PromptDocument) -> Result<String, PodcastError> {
        let raw = self.provider.complete(&self.request_for(document)).await?;
        debug!("Completion returned {} characters", raw.len());

        let script = finalize_script(&raw);
        info!("Generated script with {} words", script.split_whitespace().count());
        Ok(script)
    }
}
