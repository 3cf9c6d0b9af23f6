use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Content, FinishReason, UsageMetadata};

/// One generated alternative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content; absent when the candidate was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Feedback on the prompt itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was refused before any candidate was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Response of a `generateContent` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; the first is the answer.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Prompt-level feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// The concrete model version that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// The answer text of the first candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Blocked`] when the prompt was blocked, there is no
    /// candidate, or the first candidate stopped for a blocking reason.
    pub fn text(&self) -> Result<String> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(Error::blocked(reason));
        };
        if let Some(reason) = candidate.finish_reason
            && reason.is_blocking()
        {
            return Err(Error::blocked(reason.to_string()));
        }
        Ok(candidate
            .content
            .as_ref()
            .map(Content::joined_text)
            .unwrap_or_default())
    }
}
