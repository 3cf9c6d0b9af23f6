use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a candidate stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point or a stop sequence.
    Stop,

    /// Hit the maximum output token count.
    MaxTokens,

    /// Flagged by safety filters.
    Safety,

    /// Flagged for reciting training data.
    Recitation,

    /// Unsupported response language.
    Language,

    /// Blocked by a term blocklist.
    Blocklist,

    /// Blocked for prohibited content.
    ProhibitedContent,

    /// Blocked for sensitive personal information.
    Spii,

    /// Anything else the API reports.
    #[serde(other)]
    Other,
}

impl FinishReason {
    /// True if a candidate with this reason carries no trustworthy text.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Language
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
                | FinishReason::Spii
        )
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FinishReason::Stop => "STOP",
            FinishReason::MaxTokens => "MAX_TOKENS",
            FinishReason::Safety => "SAFETY",
            FinishReason::Recitation => "RECITATION",
            FinishReason::Language => "LANGUAGE",
            FinishReason::Blocklist => "BLOCKLIST",
            FinishReason::ProhibitedContent => "PROHIBITED_CONTENT",
            FinishReason::Spii => "SPII",
            FinishReason::Other => "OTHER",
        };
        f.write_str(name)
    }
}
