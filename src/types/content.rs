use serde::{Deserialize, Serialize};

use crate::types::Role;

/// A piece of a [`Content`].
///
/// Only text parts matter to this crate; other part kinds deserialize with
/// `text` unset and are skipped when extracting text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Inline text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set by thinking models on parts that carry reasoning rather than answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }

    /// True if this part carries answer text (not reasoning).
    pub fn is_answer_text(&self) -> bool {
        self.text.is_some() && self.thought != Some(true)
    }
}

/// A multi-part message as exchanged with `generateContent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Author of the content; absent for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated answer text of all parts.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| part.is_answer_text())
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}
