//! Text and image model collaborators.
//!
//! The orchestrator only ever talks to these traits; the OpenAI-compatible
//! client below is the production implementation, and tests inject
//! scripted models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::generation::GenerationConfig;
use crate::error::AppError;

/// Failure of a generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation response was malformed: {0}")]
    Malformed(String),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::generation(err.to_string())
    }
}

/// Produces prose from a prompt (coherence rewrite, panel split).
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

/// Produces one illustration URL from a panel description.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn illustrate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: String,
}

/// Client for an OpenAI-compatible chat-completions and images API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: &GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.text_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
        };

        let response: ChatCompletionResponse = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::Malformed("completion had no choices".to_string()))
    }
}

#[async_trait]
impl ImageModel for OpenAiClient {
    async fn illustrate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            size: "1024x1024",
            quality: "standard",
            n: 1,
        };

        let response: ImageResponse = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|datum| datum.url)
            .ok_or_else(|| GenerationError::Malformed("image response had no data".to_string()))
    }
}
