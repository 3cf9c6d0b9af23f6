use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token accounting attached to a response.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Prompt plus candidates (plus reasoning, for thinking models).
    #[serde(default)]
    pub total_token_count: u64,
}

impl UsageMetadata {
    /// Create usage from prompt and candidate counts.
    pub fn new(prompt_token_count: u64, candidates_token_count: u64) -> Self {
        Self {
            prompt_token_count,
            candidates_token_count,
            total_token_count: prompt_token_count + candidates_token_count,
        }
    }
}

impl Add for UsageMetadata {
    type Output = UsageMetadata;

    fn add(self, rhs: UsageMetadata) -> UsageMetadata {
        UsageMetadata {
            prompt_token_count: self.prompt_token_count.saturating_add(rhs.prompt_token_count),
            candidates_token_count: self
                .candidates_token_count
                .saturating_add(rhs.candidates_token_count),
            total_token_count: self.total_token_count.saturating_add(rhs.total_token_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_zero() {
        let usage: UsageMetadata =
            serde_json::from_str(r#"{"promptTokenCount": 7, "totalTokenCount": 7}"#).unwrap();
        assert_eq!(usage.prompt_token_count, 7);
        assert_eq!(usage.candidates_token_count, 0);
    }

    #[test]
    fn addition() {
        let total = UsageMetadata::new(3, 4) + UsageMetadata::new(10, 20);
        assert_eq!(total, UsageMetadata::new(13, 24));
    }
}
