use serde::{Deserialize, Serialize};

use crate::types::{Content, GenerationConfig};

/// Body of a `models/{model}:generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation so far; a single user turn for stateless prompts.
    pub contents: Vec<Content>,

    /// Optional system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Optional sampling configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A request carrying one user prompt and nothing else.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Attach a generation config, dropping it if every field is unset.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = if config.is_empty() {
            None
        } else {
            Some(config)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn prompt_only() {
        let request = GenerateContentRequest::from_prompt("fix this bug");
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "fix this bug"}]}]})
        );
    }

    #[test]
    fn empty_generation_config_is_omitted() {
        let request = GenerateContentRequest::from_prompt("x")
            .with_generation_config(GenerationConfig::default());
        assert!(request.generation_config.is_none());

        let request = GenerateContentRequest::from_prompt("x").with_generation_config(
            GenerationConfig {
                temperature: Some(0.5),
                ..GenerationConfig::default()
            },
        );
        assert_eq!(
            to_value(&request).unwrap()["generationConfig"],
            json!({"temperature": 0.5})
        );
    }
}
