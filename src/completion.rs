//! The completion boundary used by the chat session.
//!
//! The session only needs "prompt in, text out".  [`CompletionClient`] is that
//! contract; [`GeminiCompletion`] fulfils it against the Gemini API, and tests
//! substitute their own implementations.

use std::sync::Arc;

use crate::client::Gemini;
use crate::error::Result;
use crate::types::{GenerateContentRequest, GenerationConfig, Model};

/// Something that turns a prompt into generated text.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a response for `prompt`.
    ///
    /// # Errors
    ///
    /// Any provider failure.  Callers treat every error the same way.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait::async_trait]
impl<C: CompletionClient + ?Sized> CompletionClient for Arc<C> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

#[async_trait::async_trait]
impl<C: CompletionClient + ?Sized> CompletionClient for Box<C> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

/// A [`CompletionClient`] backed by a Gemini model.
///
/// Each call is stateless: only the given prompt is sent, never the earlier
/// conversation.
#[derive(Debug, Clone)]
pub struct GeminiCompletion {
    client: Gemini,
    model: Model,
    generation: GenerationConfig,
}

impl GeminiCompletion {
    /// Creates a completion client for `model`.
    pub fn new(client: Gemini, model: Model) -> Self {
        Self {
            client,
            model,
            generation: GenerationConfig::default(),
        }
    }

    /// Sets the sampling configuration sent with every call.
    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Returns the model used for generation.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Changes the model used for generation.
    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    /// Returns the sampling configuration.
    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Returns the sampling configuration for mutation.
    pub fn generation_config_mut(&mut self) -> &mut GenerationConfig {
        &mut self.generation
    }

    fn request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest::from_prompt(prompt).with_generation_config(self.generation.clone())
    }
}

#[async_trait::async_trait]
impl CompletionClient for GeminiCompletion {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.request(prompt);
        let response = self.client.generate_content(&self.model, &request).await?;
        response.text()
    }
}
