//! Generation Orchestrator: turns finished chains into story/comic artifacts.

pub mod client;
pub mod orchestrator;

pub use client::{GenerationError, ImageModel, OpenAiClient, TextModel};
pub use orchestrator::{from_config, ArtifactGenerator, OfflineGenerator, PipelineGenerator};
