// Public modules
pub mod chat;
pub mod client;
pub mod completion;
pub mod conversation;
pub mod error;
pub mod input;
pub mod markdown;
pub mod observability;
pub mod render;
pub mod types;
pub mod view;

// Re-exports
pub use chat::{
    ChatConfig, KeyOutcome, SessionController, SessionState, SessionStats, TurnOutcome,
};
pub use client::Gemini;
pub use completion::{CompletionClient, GeminiCompletion};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use input::{Edit, InputBuffer, Key, KeyCommand};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
pub use view::{DEFAULT_PAGE_SIZE, ViewState, ViewWindow, derive_view, visible_len};
