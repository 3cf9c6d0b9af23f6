use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a chat entry.
///
/// On the wire Gemini calls the assistant side `model`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Text typed by the person at the keyboard.
    #[serde(rename = "user")]
    User,

    /// Text produced by the completion provider.
    #[serde(rename = "model")]
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}
