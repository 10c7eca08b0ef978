//! Story/comic generation pipeline.
//!
//! Per finished chain: skip empty chains, rewrite the sentences into a
//! coherent story, split the story into up to four panel descriptions,
//! then request one illustration per panel. Individual image failures
//! degrade the artifact (the slot is omitted); a text-model failure fails
//! the whole call and is room-fatal for the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::generation::GenerationConfig;
use crate::domain::room::{Artifact, PlayerId};
use crate::generation::client::{GenerationError, ImageModel, OpenAiClient, TextModel};

const STORY_MAX_TOKENS: u32 = 200;
const PANELS_MAX_TOKENS: u32 = 300;
const MAX_PANELS: usize = 4;

/// Turns finished chains into per-player artifacts.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate_artifacts(
        &self,
        chains: &BTreeMap<PlayerId, Vec<String>>,
    ) -> Result<BTreeMap<PlayerId, Artifact>, GenerationError>;
}

/// Build the generator selected by configuration: the live pipeline when an
/// API key is present, canned artifacts otherwise.
pub fn from_config(config: &GenerationConfig) -> Arc<dyn ArtifactGenerator> {
    match &config.api_key {
        Some(key) => {
            let client = Arc::new(OpenAiClient::new(key.clone(), config));
            Arc::new(PipelineGenerator::new(client.clone(), client))
        }
        None => {
            info!("No generation API key configured, using offline artifacts");
            Arc::new(OfflineGenerator)
        }
    }
}

/// The live pipeline driving a text model and an image model.
pub struct PipelineGenerator {
    text: Arc<dyn TextModel>,
    image: Arc<dyn ImageModel>,
}

impl PipelineGenerator {
    pub fn new(text: Arc<dyn TextModel>, image: Arc<dyn ImageModel>) -> Self {
        Self { text, image }
    }

    async fn generate_chain(&self, sentences: &[String]) -> Result<Artifact, GenerationError> {
        let story_prompt = format!(
            "Rewrite the following chaotic sentences into one coherent, funny short story (6-10 lines).\n\nSentences:\n{}",
            sentences.join(" ")
        );
        let story = self.text.complete(&story_prompt, STORY_MAX_TOKENS).await?;

        let panel_prompt = format!(
            "Split the following story into exactly 4 comic panel descriptions.\nEach description should be 1-2 sentences and visual.\n\nStory:\n{story}"
        );
        let panel_text = self.text.complete(&panel_prompt, PANELS_MAX_TOKENS).await?;
        let panels: Vec<String> = panel_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MAX_PANELS)
            .map(String::from)
            .collect();

        // One request per panel, concurrently and independently. A failed
        // slot is omitted rather than failing the chain.
        let requests = panels.iter().map(|panel| {
            let prompt = format!("Comic book style illustration: {panel}");
            async move { self.image.illustrate(&prompt).await }
        });
        let images: Vec<String> = join_all(requests)
            .await
            .into_iter()
            .zip(panels.iter())
            .filter_map(|(result, panel)| match result {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(error = %err, panel = panel.as_str(), "Image generation failed, omitting slot");
                    None
                }
            })
            .collect();

        Ok(Artifact {
            story,
            panels,
            images,
        })
    }
}

#[async_trait]
impl ArtifactGenerator for PipelineGenerator {
    async fn generate_artifacts(
        &self,
        chains: &BTreeMap<PlayerId, Vec<String>>,
    ) -> Result<BTreeMap<PlayerId, Artifact>, GenerationError> {
        let mut results = BTreeMap::new();
        for (player_id, sentences) in chains {
            if sentences.is_empty() {
                debug!(player_id = %player_id, "Skipping empty chain");
                continue;
            }
            let artifact = self.generate_chain(sentences).await?;
            info!(
                player_id = %player_id,
                panels = artifact.panels.len(),
                images = artifact.images.len(),
                "Generated artifact for chain"
            );
            results.insert(*player_id, artifact);
        }
        Ok(results)
    }
}

/// Canned artifacts for local play without an API key. The event flow is
/// identical to the live pipeline; images are simply absent.
pub struct OfflineGenerator;

#[async_trait]
impl ArtifactGenerator for OfflineGenerator {
    async fn generate_artifacts(
        &self,
        chains: &BTreeMap<PlayerId, Vec<String>>,
    ) -> Result<BTreeMap<PlayerId, Artifact>, GenerationError> {
        let mut results = BTreeMap::new();
        for (player_id, sentences) in chains {
            if sentences.is_empty() {
                continue;
            }
            results.insert(
                *player_id,
                Artifact {
                    story: format!(
                        "Here's a funny story: {} And they all lived hilariously ever after!",
                        sentences.join(" ")
                    ),
                    panels: vec![
                        "Panel 1: The adventure begins with our heroes in an unexpected situation"
                            .to_string(),
                        "Panel 2: Things get more complicated as chaos ensues".to_string(),
                        "Panel 3: A surprising twist changes everything".to_string(),
                        "Panel 4: The hilarious conclusion that nobody saw coming".to_string(),
                    ],
                    images: Vec::new(),
                },
            );
        }
        Ok(results)
    }
}
