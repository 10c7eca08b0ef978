use std::env;

/// Configuration for the story/image generation collaborators.
///
/// When no API key is configured the orchestrator runs in offline mode
/// with canned models, preserving the full event flow for local play.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key for the OpenAI-compatible endpoint; `None` selects offline mode.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub base_url: String,
    /// Chat-completions model used for story rewrite and panel split.
    pub text_model: String,
    /// Image model used for panel illustrations.
    pub image_model: String,
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        let text_model =
            env::var("OPENAI_TEXT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let image_model =
            env::var("OPENAI_IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string());

        Self {
            api_key,
            base_url,
            text_model,
            image_model,
        }
    }

    pub fn offline(&self) -> bool {
        self.api_key.is_none()
    }
}
