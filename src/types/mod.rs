// Public modules
pub mod chat_entry;
pub mod content;
pub mod finish_reason;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod generation_config;
pub mod model;
pub mod role;
pub mod session_status;
pub mod usage_metadata;

// Re-exports
pub use chat_entry::ChatEntry;
pub use content::{Content, Part};
pub use finish_reason::FinishReason;
pub use generate_content_request::GenerateContentRequest;
pub use generate_content_response::{Candidate, GenerateContentResponse, PromptFeedback};
pub use generation_config::GenerationConfig;
pub use model::{KnownModel, Model, UnknownModelError};
pub use role::Role;
pub use session_status::SessionStatus;
pub use usage_metadata::UsageMetadata;
